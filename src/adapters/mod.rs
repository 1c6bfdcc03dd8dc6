pub mod sui_rpc;
mod traits;

pub use sui_rpc::SuiRpcClient;
pub use traits::{ChainClient, CoinSource, ExecutionStatus, TransactionOutcome};
