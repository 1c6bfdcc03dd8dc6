//! Sui fullnode JSON-RPC adapter (native Rust, no SDK dependency).

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use super::traits::{ChainClient, CoinSource, ExecutionStatus, TransactionOutcome};
use crate::domain::{AccountState, CoinPage, ObjectId, SuiAddress};
use crate::error::{ClaimerError, Result};

pub const SUI_MAINNET_RPC: &str = "https://fullnode.mainnet.sui.io:443";

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Clone)]
pub struct SuiRpcClient {
    http: Client,
    url: String,
    next_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for SuiRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiRpcClient").field("url", &self.url).finish()
    }
}

impl SuiRpcClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent("ocean-claimer/0.1")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call_raw(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!("rpc {} #{}", method, id);
        let response: RpcResponse = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.error {
            return Err(ClaimerError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        Ok(response.result.unwrap_or(Value::Null))
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let raw = self.call_raw(method, params).await?;
        Ok(serde_json::from_value(raw)?)
    }
}

fn parse_u64(value: &Value, what: &str) -> Result<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
    .ok_or_else(|| ClaimerError::Validation(format!("missing or invalid {}: {}", what, value)))
}

fn parse_u128(value: &Value, what: &str) -> Result<u128> {
    match value {
        Value::Number(n) => n.as_u64().map(u128::from),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
    .ok_or_else(|| ClaimerError::Validation(format!("missing or invalid {}: {}", what, value)))
}

/// `effects.status` of a dry-run or execution result.
pub(crate) fn parse_execution_status(result: &Value) -> ExecutionStatus {
    let status = &result["effects"]["status"];
    match status["status"].as_str() {
        Some("success") => ExecutionStatus::success(),
        Some(_) => ExecutionStatus::failure(
            status["error"]
                .as_str()
                .unwrap_or("transaction failed without error message"),
        ),
        None => ExecutionStatus::failure("response carried no effects status"),
    }
}

/// Player record from a `suix_getDynamicFieldObject` result.
pub(crate) fn parse_dynamic_field(result: &Value) -> Result<Option<AccountState>> {
    if result.get("error").is_some_and(|e| !e.is_null()) {
        debug!("No player record: {}", result["error"]);
        return Ok(None);
    }
    let fields = &result["data"]["content"]["fields"];
    if fields.is_null() {
        return Ok(None);
    }
    AccountState::from_fields(fields).map(Some)
}

/// `owner.Shared.initial_shared_version` from a `sui_getObject` result.
pub(crate) fn parse_initial_shared_version(result: &Value, id: &ObjectId) -> Result<u64> {
    let shared = &result["data"]["owner"]["Shared"];
    if shared.is_null() {
        return Err(ClaimerError::Validation(format!(
            "object {} is not shared",
            id
        )));
    }
    parse_u64(&shared["initial_shared_version"], "initial_shared_version")
}

#[async_trait]
impl CoinSource for SuiRpcClient {
    #[instrument(skip(self))]
    async fn list_coins(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
        cursor: Option<String>,
    ) -> Result<CoinPage> {
        self.call(
            "suix_getCoins",
            json!([owner.to_hex(), coin_type, cursor, Value::Null]),
        )
        .await
    }
}

#[async_trait]
impl ChainClient for SuiRpcClient {
    async fn get_balance(&self, owner: &SuiAddress, coin_type: &str) -> Result<u128> {
        let result = self
            .call_raw("suix_getBalance", json!([owner.to_hex(), coin_type]))
            .await?;
        parse_u128(&result["totalBalance"], "totalBalance")
    }

    async fn get_account_state(
        &self,
        parent: &ObjectId,
        owner: &SuiAddress,
    ) -> Result<Option<AccountState>> {
        let result = self
            .call_raw(
                "suix_getDynamicFieldObject",
                json!([parent.to_hex(), {"type": "address", "value": owner.to_hex()}]),
            )
            .await?;
        parse_dynamic_field(&result)
    }

    async fn get_initial_shared_version(&self, id: &ObjectId) -> Result<u64> {
        let result = self
            .call_raw("sui_getObject", json!([id.to_hex(), {"showOwner": true}]))
            .await?;
        parse_initial_shared_version(&result, id)
    }

    async fn reference_gas_price(&self) -> Result<u64> {
        let result = self
            .call_raw("suix_getReferenceGasPrice", json!([]))
            .await?;
        parse_u64(&result, "reference gas price")
    }

    async fn dry_run(&self, tx_bytes: &[u8]) -> Result<ExecutionStatus> {
        let result = self
            .call_raw(
                "sui_dryRunTransactionBlock",
                json!([BASE64_STANDARD.encode(tx_bytes)]),
            )
            .await?;
        Ok(parse_execution_status(&result))
    }

    async fn execute(&self, tx_bytes: &[u8], signature: &str) -> Result<TransactionOutcome> {
        let result = self
            .call_raw(
                "sui_executeTransactionBlock",
                json!([
                    BASE64_STANDARD.encode(tx_bytes),
                    [signature],
                    {"showEffects": true},
                    "WaitForLocalExecution"
                ]),
            )
            .await?;

        let digest = result["digest"].as_str().unwrap_or_default().to_string();
        Ok(TransactionOutcome {
            digest,
            status: parse_execution_status(&result),
        })
    }
}
