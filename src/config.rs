use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::adapters::sui_rpc::SUI_MAINNET_RPC;
use crate::domain::{ObjectId, SuiAddress};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Fullnode JSON-RPC endpoint
    pub url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: SUI_MAINNET_RPC.to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// The deployed game contract
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub package_id: String,
    pub module: String,
    pub claim_function: String,
    /// Shared game object; player records are dynamic fields under it
    pub state_object_id: String,
    pub clock_object_id: String,
    pub reward_coin_type: String,
    pub reward_decimals: u32,
    /// Gas budget per transaction, in MIST
    pub gas_budget: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            package_id: "0x1efaf509c9b7e986ee724596f526a22b474b15c376136772c00b8452f204d2d1"
                .to_string(),
            module: "game".to_string(),
            claim_function: "claim".to_string(),
            state_object_id: "0x4846a1f1030deffd9dea59016402d832588cf7e0c27b9e4c1a63d2b5e152873a"
                .to_string(),
            clock_object_id: "0x6".to_string(),
            reward_coin_type:
                "0xa8816d3a6e3136e86bc2873b1f94a15cadc8af2703c075f2d546c2ae367f4df9::ocean::OCEAN"
                    .to_string(),
            reward_decimals: 9,
            gas_budget: 10_000_000,
        }
    }
}

impl GameConfig {
    pub fn package(&self) -> Result<ObjectId, String> {
        parse_address("game.package_id", &self.package_id)
    }

    pub fn state_object(&self) -> Result<ObjectId, String> {
        parse_address("game.state_object_id", &self.state_object_id)
    }

    pub fn clock_object(&self) -> Result<ObjectId, String> {
        parse_address("game.clock_object_id", &self.clock_object_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Credential store (JSON array of `{address, phrase}`)
    pub accounts: PathBuf,
    /// Static reward schedule document
    pub schedule: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            accounts: PathBuf::from("loginWave.json"),
            schedule: PathBuf::from("gameInfo.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Pause after an account was processed successfully
    pub success_delay_ms: u64,
    /// First pause after a failure
    pub error_delay_ms: u64,
    /// Upper bound for the failure backoff
    pub max_error_delay_ms: u64,
    pub backoff_factor: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            success_delay_ms: 5_000,
            error_delay_ms: 10_000,
            max_error_delay_ms: 60_000,
            backoff_factor: 2,
        }
    }
}

/// Forwarding of accumulated reward tokens to a main wallet
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub enabled: bool,
    #[serde(default)]
    pub main_wallet: Option<String>,
    /// Minimum balance, in whole tokens, before a sweep is attempted
    pub min_balance: Decimal,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            main_wallet: None,
            min_balance: Decimal::from(20),
        }
    }
}

impl SweepConfig {
    pub fn main_wallet(&self) -> Result<Option<SuiAddress>, String> {
        self.main_wallet
            .as_deref()
            .map(|raw| parse_address("sweep.main_wallet", raw))
            .transpose()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Also write daily-rotated log files into this directory
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn parse_address(field: &str, raw: &str) -> Result<SuiAddress, String> {
    raw.parse::<SuiAddress>()
        .map_err(|e| format!("{} is not a valid address: {}", field, e))
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("OCEAN_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (OCEAN_RPC__URL, etc.)
            .add_source(
                Environment::with_prefix("OCEAN")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = url::Url::parse(&self.rpc.url) {
            errors.push(format!("rpc.url is not a valid URL: {}", e));
        }
        if self.rpc.timeout_ms == 0 {
            errors.push("rpc.timeout_ms must be positive".to_string());
        }

        for check in [
            self.game.package(),
            self.game.state_object(),
            self.game.clock_object(),
        ] {
            if let Err(e) = check {
                errors.push(e);
            }
        }
        if !self.game.reward_coin_type.contains("::") {
            errors.push(format!(
                "game.reward_coin_type is not a coin type: {}",
                self.game.reward_coin_type
            ));
        }
        if self.game.gas_budget == 0 {
            errors.push("game.gas_budget must be positive".to_string());
        }

        if self.poller.success_delay_ms == 0 || self.poller.error_delay_ms == 0 {
            errors.push("poller delays must be positive".to_string());
        }
        if self.poller.max_error_delay_ms < self.poller.error_delay_ms {
            errors.push("poller.max_error_delay_ms must be >= poller.error_delay_ms".to_string());
        }
        if self.poller.backoff_factor == 0 {
            errors.push("poller.backoff_factor must be at least 1".to_string());
        }

        match self.sweep.main_wallet() {
            Err(e) => errors.push(e),
            Ok(None) if self.sweep.enabled => {
                errors.push("sweep.main_wallet is required when sweep is enabled".to_string())
            }
            Ok(_) => {}
        }
        if self.sweep.min_balance.is_sign_negative() {
            errors.push("sweep.min_balance must not be negative".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
