//! Ocean claimer CLI
//!
//! Commands:
//! - `ocean-claimer accounts` - Manage stored credentials
//! - `ocean-claimer status` - One read-only pass over all accounts
//! - `ocean-claimer run` - Claim (and optionally sweep) in a loop

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Wave on Sui ocean reward claimer
#[derive(Parser, Debug)]
#[command(name = "ocean-claimer")]
#[command(author, version, about = "Automated reward claimer for the Wave on Sui ocean game")]
pub struct Cli {
    /// Configuration directory (default.toml and <OCEAN_ENV>.toml)
    #[arg(long, global = true, env = "OCEAN_CONFIG_DIR", default_value = "config")]
    pub config: PathBuf,

    /// Output as JSON instead of human-readable tables.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage stored wallet credentials
    #[command(subcommand)]
    Accounts(AccountsCommands),

    /// Show balance and claim progress of every account without claiming
    Status,

    /// Poll all accounts, claiming whenever a fishing cycle completes
    Run {
        /// Forward the reward balance to the configured main wallet
        #[arg(long)]
        sweep: bool,
        /// Make a single pass over the accounts and exit
        #[arg(long)]
        once: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum AccountsCommands {
    /// List stored accounts
    List,
    /// Store a new account from its recovery phrase
    Add {
        /// Recovery phrase; prompted for (hidden) when omitted.
        /// WARNING: CLI args are visible in `ps` output and shell history.
        #[arg(long)]
        phrase: Option<String>,
    },
    /// Delete an account by list index or address
    Delete {
        /// Index from `accounts list`, or the account address
        selector: String,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

impl Commands {
    /// Long-running commands get full logging.
    pub fn is_long_running(&self) -> bool {
        matches!(self, Commands::Run { once: false, .. })
    }
}
