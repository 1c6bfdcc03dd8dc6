use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{AccountState, CoinPage, ObjectId, SuiAddress};
use crate::error::Result;

/// Outcome of executing (or dry-running) a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionStatus {
    pub success: bool,
    pub error: Option<String>,
}

impl ExecutionStatus {
    pub fn success() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Submitted transaction digest plus its effects status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionOutcome {
    pub digest: String,
    pub status: ExecutionStatus,
}

/// Paginated listing of an owner's coins of one type.
#[async_trait]
pub trait CoinSource: Send + Sync {
    async fn list_coins(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
        cursor: Option<String>,
    ) -> Result<CoinPage>;
}

/// Everything the claimer needs from a chain node.
#[async_trait]
pub trait ChainClient: CoinSource {
    /// Total balance of `coin_type` in base units.
    async fn get_balance(&self, owner: &SuiAddress, coin_type: &str) -> Result<u128>;

    /// Player record stored under `parent` keyed by `owner`; `None` when the player has none.
    async fn get_account_state(
        &self,
        parent: &ObjectId,
        owner: &SuiAddress,
    ) -> Result<Option<AccountState>>;

    async fn get_initial_shared_version(&self, id: &ObjectId) -> Result<u64>;

    async fn reference_gas_price(&self) -> Result<u64>;

    async fn dry_run(&self, tx_bytes: &[u8]) -> Result<ExecutionStatus>;

    /// Execute a signed transaction and wait for local execution.
    async fn execute(&self, tx_bytes: &[u8], signature: &str) -> Result<TransactionOutcome>;
}
