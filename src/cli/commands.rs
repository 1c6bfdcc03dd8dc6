//! Command handlers.

use anyhow::{bail, Context};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::output::{self, AccountRow, OutputMode, StatusRow};
use super::{AccountsCommands, Cli, Commands};
use crate::adapters::SuiRpcClient;
use crate::config::AppConfig;
use crate::coordination::Shutdown;
use crate::domain::RewardSchedule;
use crate::persistence::{CredentialSelector, CredentialStore};
use crate::strategy::{
    AccountPoller, ClaimService, ClaimSettings, PollEvent, PollerSettings, PollingTask,
};

/// Load and validate configuration from `dir`.
pub fn load_config(dir: &Path) -> anyhow::Result<AppConfig> {
    let config = AppConfig::load_from(dir)
        .with_context(|| format!("failed to load configuration from {}", dir.display()))?;
    if let Err(errors) = config.validate() {
        bail!("invalid configuration:\n  {}", errors.join("\n  "));
    }
    Ok(config)
}

/// Run the parsed command. `shutdown` is triggered by the caller on Ctrl+C/SIGTERM.
pub async fn dispatch(cli: Cli, config: AppConfig, shutdown: Shutdown) -> anyhow::Result<()> {
    let mode = OutputMode::from_json_flag(cli.json);
    match cli.command {
        Commands::Accounts(cmd) => accounts(cmd, &config, mode),
        Commands::Status => status(&config, mode).await,
        Commands::Run { sweep, once } => run(&config, sweep, once, mode, shutdown).await,
    }
}

fn open_store(config: &AppConfig) -> anyhow::Result<CredentialStore> {
    CredentialStore::open(&config.files.accounts).with_context(|| {
        format!(
            "failed to open credential store {}",
            config.files.accounts.display()
        )
    })
}

pub fn accounts(cmd: AccountsCommands, config: &AppConfig, mode: OutputMode) -> anyhow::Result<()> {
    let mut store = open_store(config)?;

    match cmd {
        AccountsCommands::List => {
            let rows: Vec<AccountRow> = store
                .credentials()
                .iter()
                .enumerate()
                .map(|(index, credential)| AccountRow::new(index, credential))
                .collect();
            output::print_items(&rows, mode)?;
        }
        AccountsCommands::Add { phrase } => {
            let phrase = match phrase {
                Some(phrase) => phrase,
                // Use rpassword to hide input from terminal echo and shoulder surfing
                None => rpassword::prompt_password("Recovery phrase: ")?,
            };
            if phrase.trim().is_empty() {
                bail!("no phrase provided");
            }
            let credential = store.add(&phrase).context("failed to add account")?;
            output::print_success(&format!("Successfully input wallet {}", credential.address));
        }
        AccountsCommands::Delete { selector, yes } => {
            let selector: CredentialSelector = selector
                .parse()
                .with_context(|| format!("'{}' is neither an index nor an address", selector))?;
            if !yes && !output::confirm(&format!("Delete account {:?}?", selector)) {
                output::print_warn("Aborted");
                return Ok(());
            }
            let removed = store.delete(selector)?;
            output::print_success(&format!("Successfully deleted account {}", removed.address));
        }
    }
    Ok(())
}

fn build_service(config: &AppConfig, force_sweep: bool) -> anyhow::Result<ClaimService<SuiRpcClient>> {
    let client = SuiRpcClient::new(&config.rpc.url, Duration::from_millis(config.rpc.timeout_ms))
        .context("failed to build RPC client")?;
    let settings = ClaimSettings::from_config(config, force_sweep)?;
    let schedule = RewardSchedule::load(&config.files.schedule).with_context(|| {
        format!(
            "failed to load reward schedule {}",
            config.files.schedule.display()
        )
    })?;
    if schedule.is_none() {
        output::print_warn(&format!(
            "Reward schedule {} not found; nothing will be claimable",
            config.files.schedule.display()
        ));
    }
    Ok(ClaimService::new(client, settings, schedule))
}

/// One read-only pass over every stored account.
pub async fn status(config: &AppConfig, mode: OutputMode) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let service = build_service(config, false)?.read_only();

    let mut rows = Vec::new();
    for (index, credential) in store.credentials().iter().enumerate() {
        if !credential.has_phrase() {
            continue;
        }
        match service.poll_account(index, credential).await {
            Ok(report) => rows.push(StatusRow::from(&report)),
            Err(e) => output::print_error(&format!("[{}] {}: {}", index, credential.address, e)),
        }
    }
    output::print_items(&rows, mode)
}

/// The polling loop. Stops on shutdown, or after one pass with `once`.
pub async fn run(
    config: &AppConfig,
    force_sweep: bool,
    once: bool,
    mode: OutputMode,
    shutdown: Shutdown,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let service = Arc::new(build_service(config, force_sweep)?);
    if let Some(sweep) = &service.settings().sweep {
        info!(
            "Sweeping balances of at least {} to {}",
            sweep.min_balance, sweep.main_wallet
        );
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut task = PollingTask::new(
        service,
        store.credentials().to_vec(),
        PollerSettings::from(&config.poller),
        shutdown.token(),
    )
    .with_events(tx);

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Err(e) = print_event(&event, mode) {
                warn!("Failed to print poll event: {}", e);
            }
        }
    });

    let summary = if once {
        task.run_rounds(1).await
    } else {
        task.run().await
    };
    // closes the event channel so the printer drains and exits
    drop(task);
    printer.await.context("event printer panicked")?;

    info!(
        "Finished: {} round(s), {} ok, {} failed",
        summary.rounds, summary.succeeded, summary.failed
    );
    Ok(())
}

fn print_event(event: &PollEvent, mode: OutputMode) -> anyhow::Result<()> {
    match (event, mode) {
        (PollEvent::Report(report), OutputMode::Json) => output::print_json(report),
        (PollEvent::Report(report), OutputMode::Table) => {
            output::print_items(&[StatusRow::from(report)], mode)
        }
        (
            PollEvent::Failed {
                index,
                address,
                error,
                retry_in,
            },
            _,
        ) => {
            output::print_error(&format!(
                "[{}] {}: {} (waiting {}s)",
                index,
                address,
                error,
                retry_in.as_secs()
            ));
            Ok(())
        }
    }
}
