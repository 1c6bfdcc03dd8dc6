//! Output formatting for CLI commands.
//!
//! Supports two modes: human-readable tables (default) and JSON (--json).

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::persistence::Credential;
use crate::strategy::{AccountReport, ClaimStatus, SweepStatus};

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

/// Print a vec of Tabled + Serialize items in the chosen mode.
pub fn print_items<T: Tabled + Serialize>(items: &[T], mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Table => {
            if items.is_empty() {
                println!("(no results)");
            } else {
                let table = Table::new(items).to_string();
                println!("{table}");
            }
        }
        OutputMode::Json => {
            let json = serde_json::to_string_pretty(items)?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Print a single Serialize item as JSON.
pub fn print_json<T: Serialize>(item: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(item)?);
    Ok(())
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("\x1b[32m{msg}\x1b[0m");
}

/// Print a warning message.
pub fn print_warn(msg: &str) {
    println!("\x1b[33m{msg}\x1b[0m");
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("\x1b[31m{msg}\x1b[0m");
}

/// Prompt user for confirmation. Returns true if confirmed.
pub fn confirm(prompt: &str) -> bool {
    use std::io::{self, Write};
    print!("{prompt} [y/N] ");
    io::stdout().flush().ok();
    let mut input = String::new();
    io::stdin().read_line(&mut input).ok();
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[derive(Debug, Tabled, Serialize)]
pub struct AccountRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Address")]
    pub address: String,
    #[tabled(rename = "Phrase")]
    pub has_phrase: bool,
}

impl AccountRow {
    pub fn new(index: usize, credential: &Credential) -> Self {
        Self {
            index,
            address: credential.address.to_string(),
            has_phrase: credential.has_phrase(),
        }
    }
}

#[derive(Debug, Tabled, Serialize)]
pub struct StatusRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Address")]
    pub address: String,
    #[tabled(rename = "Ocean")]
    pub balance: String,
    #[tabled(rename = "Boat/Mesh/Fish")]
    pub levels: String,
    #[tabled(rename = "Unclaimed")]
    pub unclaimed: String,
    #[tabled(rename = "Progress")]
    pub progress: String,
    #[tabled(rename = "Claim In")]
    pub time_to_claim: String,
    #[tabled(rename = "Claim")]
    pub claim: String,
    #[tabled(rename = "Sweep")]
    pub sweep: String,
}

impl From<&AccountReport> for StatusRow {
    fn from(report: &AccountReport) -> Self {
        Self {
            index: report.index,
            address: short_address(&report.address.to_string()),
            balance: report.balance.to_string(),
            levels: report
                .account
                .as_ref()
                .map(|a| format!("{}/{}/{}", a.boat, a.mesh, a.seafood))
                .unwrap_or_else(|| "new".to_string()),
            unclaimed: report.finishing.unclaimed_amount.to_string(),
            progress: format_progress(report.finishing.progress),
            time_to_claim: format_duration_ms(report.finishing.time_to_claim_ms),
            claim: claim_label(&report.claim),
            sweep: report
                .sweep
                .as_ref()
                .map(sweep_label)
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub fn claim_label(status: &ClaimStatus) -> String {
    match status {
        ClaimStatus::NotReady => "not time yet".to_string(),
        ClaimStatus::Ready => "ready".to_string(),
        ClaimStatus::Claimed { digest } => format!("claimed {}", digest),
        ClaimStatus::Failed { error } => format!("failed: {}", error),
    }
}

pub fn sweep_label(status: &SweepStatus) -> String {
    match status {
        SweepStatus::BelowThreshold => "below threshold".to_string(),
        SweepStatus::Sent { digest, amount } => format!("sent {} ({})", amount, digest),
        SweepStatus::Failed { error } => format!("failed: {}", error),
    }
}

/// `0x1234…abcd`
pub fn short_address(address: &str) -> String {
    if address.len() <= 14 {
        return address.to_string();
    }
    format!("{}…{}", &address[..6], &address[address.len() - 4..])
}

pub fn format_progress(progress: Decimal) -> String {
    format!(
        "{}%",
        progress.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// `1h 02m 03s`, or `now` for zero.
pub fn format_duration_ms(ms: u64) -> String {
    let secs = ms / 1000;
    if secs == 0 {
        return "now".to_string();
    }
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration_ms(0), "now");
        assert_eq!(format_duration_ms(999), "now");
        assert_eq!(format_duration_ms(42_000), "42s");
        assert_eq!(format_duration_ms(61_000), "1m 01s");
        assert_eq!(format_duration_ms(3_723_000), "1h 02m 03s");
    }

    #[test]
    fn test_format_progress() {
        assert_eq!(format_progress(dec!(33.33333)), "33.33%");
        assert_eq!(format_progress(dec!(150)), "150%");
    }

    #[test]
    fn test_short_address() {
        let full = format!("0x{}", "ab".repeat(32));
        assert_eq!(short_address(&full), "0xabab…abab");
        assert_eq!(short_address("0x6"), "0x6");
    }

    #[test]
    fn test_labels() {
        assert_eq!(claim_label(&ClaimStatus::NotReady), "not time yet");
        assert_eq!(
            sweep_label(&SweepStatus::Sent {
                digest: "D1".to_string(),
                amount: dec!(25),
            }),
            "sent 25 (D1)"
        );
    }
}
