use thiserror::Error;

/// Main error type for the claimer
#[derive(Error, Debug)]
pub enum ClaimerError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Reward schedule error: {0}")]
    Schedule(String),

    #[error("Level index {index} out of range for {table} (len {len})")]
    LevelOutOfRange {
        table: &'static str,
        index: u64,
        len: usize,
    },

    #[error("Special boost index {index} out of range (len {len})")]
    BoostOutOfRange { index: u64, len: usize },

    // Funding errors
    #[error("Insufficient funds of {coin_type}: required {required}, available {available}")]
    InsufficientFunds {
        coin_type: String,
        required: u64,
        available: u128,
    },

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Transaction failed: {0}")]
    Transaction(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("BCS serialization error: {0}")]
    Bcs(#[from] bcs::Error),

    // Crypto/signing errors
    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Signature error: {0}")]
    Signature(String),

    #[error("Credential store error: {0}")]
    Credentials(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ClaimerError {
    /// Network and chain-side failures that a later poll may not hit again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClaimerError::Http(_) | ClaimerError::Rpc { .. } | ClaimerError::Transaction(_)
        )
    }

    /// Errors caused by a bad reward schedule or a player record that doesn't fit it.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ClaimerError::Config(_)
                | ClaimerError::Schedule(_)
                | ClaimerError::LevelOutOfRange { .. }
                | ClaimerError::BoostOutOfRange { .. }
        )
    }
}

/// Result type alias for ClaimerError
pub type Result<T> = std::result::Result<T, ClaimerError>;
