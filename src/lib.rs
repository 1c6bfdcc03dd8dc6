pub mod adapters;
pub mod cli;
pub mod config;
pub mod coordination;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod signing;
pub mod strategy;
pub mod transaction;

pub use adapters::{ChainClient, CoinSource, SuiRpcClient};
pub use config::AppConfig;
pub use coordination::{Shutdown, ShutdownSignal};
pub use error::{ClaimerError, Result};
pub use persistence::{Credential, CredentialStore};
pub use signing::Wallet;
pub use strategy::{
    AccountReport, ClaimService, CoinAggregator, FinishingInfo, PollingTask, RewardCalculator,
};
