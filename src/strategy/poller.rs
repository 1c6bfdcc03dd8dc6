//! Structured polling task
//!
//! Walks the stored credentials in file order, one account at a time, and
//! pauses between accounts: a fixed delay after success, an exponential
//! backoff after consecutive failures of the same account. Every pause is
//! cancelled by shutdown; an in-flight poll is allowed to finish.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::claimer::{AccountPoller, AccountReport};
use crate::config::PollerConfig;
use crate::coordination::ShutdownToken;
use crate::domain::SuiAddress;
use crate::persistence::Credential;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerSettings {
    pub success_delay: Duration,
    pub error_delay: Duration,
    pub max_error_delay: Duration,
    pub backoff_factor: u32,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self::from(&PollerConfig::default())
    }
}

impl From<&PollerConfig> for PollerSettings {
    fn from(config: &PollerConfig) -> Self {
        Self {
            success_delay: Duration::from_millis(config.success_delay_ms),
            error_delay: Duration::from_millis(config.error_delay_ms),
            max_error_delay: Duration::from_millis(config.max_error_delay_ms),
            backoff_factor: config.backoff_factor.max(1),
        }
    }
}

impl PollerSettings {
    /// `error_delay * factor^(failures - 1)`, capped at `max_error_delay`.
    pub fn error_delay_for(&self, consecutive_failures: u32) -> Duration {
        let exponent = consecutive_failures.saturating_sub(1);
        let multiplier = self.backoff_factor.max(1).saturating_pow(exponent);
        self.error_delay
            .saturating_mul(multiplier)
            .min(self.max_error_delay)
    }
}

/// Emitted after every poll attempt
#[derive(Debug, Clone)]
pub enum PollEvent {
    Report(AccountReport),
    Failed {
        index: usize,
        address: SuiAddress,
        error: String,
        retry_in: Duration,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Completed passes over the credential list
    pub rounds: usize,
    pub succeeded: usize,
    pub failed: usize,
}

pub struct PollingTask<P: AccountPoller + ?Sized> {
    poller: Arc<P>,
    credentials: Vec<Credential>,
    settings: PollerSettings,
    shutdown: ShutdownToken,
    events: Option<mpsc::UnboundedSender<PollEvent>>,
}

impl<P: AccountPoller + ?Sized> PollingTask<P> {
    pub fn new(
        poller: Arc<P>,
        credentials: Vec<Credential>,
        settings: PollerSettings,
        shutdown: ShutdownToken,
    ) -> Self {
        Self {
            poller,
            credentials,
            settings,
            shutdown,
            events: None,
        }
    }

    /// Send a [`PollEvent`] for every attempt to `tx`.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<PollEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Poll until shutdown.
    pub async fn run(&mut self) -> PollSummary {
        self.drive(None).await
    }

    /// Poll at most `rounds` passes over the credential list.
    pub async fn run_rounds(&mut self, rounds: usize) -> PollSummary {
        self.drive(Some(rounds)).await
    }

    async fn drive(&mut self, limit: Option<usize>) -> PollSummary {
        let mut summary = PollSummary::default();
        let pollable = self.credentials.iter().filter(|c| c.has_phrase()).count();
        if pollable == 0 {
            warn!("No credentials with a phrase to poll");
            return summary;
        }
        info!(
            "Polling {} account(s) ({} stored)",
            pollable,
            self.credentials.len()
        );

        let mut failures = vec![0u32; self.credentials.len()];
        let mut pending_delay: Option<Duration> = None;

        'rounds: while limit.map_or(true, |limit| summary.rounds < limit) {
            for index in 0..self.credentials.len() {
                let credential = &self.credentials[index];
                if !credential.has_phrase() {
                    debug!("[{}] {} has no phrase, skipping", index, credential.address);
                    continue;
                }

                if let Some(delay) = pending_delay.take() {
                    if !self.pause(delay).await {
                        break 'rounds;
                    }
                }
                if self.shutdown.is_requested() {
                    break 'rounds;
                }

                let credential = &self.credentials[index];
                let delay = match self.poller.poll_account(index, credential).await {
                    Ok(report) => {
                        failures[index] = 0;
                        summary.succeeded += 1;
                        self.emit(PollEvent::Report(report));
                        self.settings.success_delay
                    }
                    Err(e) => {
                        failures[index] += 1;
                        summary.failed += 1;
                        let retry_in = self.settings.error_delay_for(failures[index]);
                        if e.is_transient() {
                            warn!(
                                "[{}] {} poll failed ({} in a row), retrying in {:?}: {}",
                                index, credential.address, failures[index], retry_in, e
                            );
                        } else {
                            error!(
                                "[{}] {} poll failed ({} in a row), retrying in {:?}: {}",
                                index, credential.address, failures[index], retry_in, e
                            );
                        }
                        self.emit(PollEvent::Failed {
                            index,
                            address: credential.address,
                            error: e.to_string(),
                            retry_in,
                        });
                        retry_in
                    }
                };
                pending_delay = Some(delay);
            }
            summary.rounds += 1;
        }

        info!(
            "Polling stopped after {} round(s): {} ok, {} failed",
            summary.rounds, summary.succeeded, summary.failed
        );
        summary
    }

    /// Sleep unless shutdown comes first. Returns false on shutdown.
    async fn pause(&mut self, delay: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(delay) => true,
            signal = self.shutdown.cancelled() => {
                debug!("Pause interrupted by {}", signal);
                false
            }
        }
    }

    fn emit(&self, event: PollEvent) {
        if let Some(tx) = &self.events {
            // receiver gone means nobody is listening
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::{Shutdown, ShutdownSignal};
    use crate::error::ClaimerError;
    use crate::strategy::claimer::{ClaimStatus, MockAccountPoller};
    use crate::strategy::reward::FinishingInfo;
    use mockall::Sequence;
    use rust_decimal::Decimal;
    use tokio::time::Instant;

    fn credential(n: u8, phrase: &str) -> Credential {
        let mut bytes = [0u8; 32];
        bytes[31] = n;
        Credential {
            address: SuiAddress::new(bytes),
            phrase: phrase.to_string(),
        }
    }

    fn report(index: usize, credential: &Credential) -> AccountReport {
        AccountReport {
            index,
            address: credential.address,
            balance_raw: 0,
            balance: Decimal::ZERO,
            account: None,
            finishing: FinishingInfo::zero(),
            claim: ClaimStatus::NotReady,
            sweep: None,
        }
    }

    fn settings() -> PollerSettings {
        PollerSettings {
            success_delay: Duration::from_secs(5),
            error_delay: Duration::from_secs(10),
            max_error_delay: Duration::from_secs(60),
            backoff_factor: 2,
        }
    }

    fn network_error() -> ClaimerError {
        ClaimerError::Rpc {
            code: -32000,
            message: "node unavailable".to_string(),
        }
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let s = settings();
        let delays: Vec<u64> = (1..=5).map(|n| s.error_delay_for(n).as_secs()).collect();
        assert_eq!(delays, vec![10, 20, 40, 60, 60]);
        assert_eq!(s.error_delay_for(u32::MAX), Duration::from_secs(60));
    }

    #[test]
    fn test_factor_one_is_fixed_delay() {
        let s = PollerSettings {
            backoff_factor: 1,
            ..settings()
        };
        assert_eq!(s.error_delay_for(7), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rounds_visit_accounts_in_order_and_skip_empty_phrases() {
        let mut poller = MockAccountPoller::new();
        let mut seq = Sequence::new();
        for _ in 0..2 {
            for expected in [0usize, 2] {
                poller
                    .expect_poll_account()
                    .withf(move |index, _| *index == expected)
                    .times(1)
                    .in_sequence(&mut seq)
                    .returning(|index, credential| Ok(report(index, credential)));
            }
        }

        let credentials = vec![credential(1, "a b c"), credential(2, "  "), credential(3, "d e f")];
        let shutdown = Shutdown::new();
        let mut task = PollingTask::new(Arc::new(poller), credentials, settings(), shutdown.token());

        let started = Instant::now();
        let summary = task.run_rounds(2).await;

        assert_eq!(
            summary,
            PollSummary {
                rounds: 2,
                succeeded: 4,
                failed: 0
            }
        );
        // three pauses between four polls, none after the last
        assert_eq!(started.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_back_off_exponentially() {
        let mut poller = MockAccountPoller::new();
        poller
            .expect_poll_account()
            .times(3)
            .returning(|_, _| Err(network_error()));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let shutdown = Shutdown::new();
        let mut task = PollingTask::new(
            Arc::new(poller),
            vec![credential(1, "a b c")],
            settings(),
            shutdown.token(),
        )
        .with_events(tx);

        let started = Instant::now();
        let summary = task.run_rounds(3).await;

        assert_eq!(summary.failed, 3);
        assert_eq!(started.elapsed(), Duration::from_secs(10 + 20));

        let mut retries = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                PollEvent::Failed { retry_in, .. } => retries.push(retry_in.as_secs()),
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert_eq!(retries, vec![10, 20, 40]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_backoff() {
        let mut poller = MockAccountPoller::new();
        let mut seq = Sequence::new();
        poller
            .expect_poll_account()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(network_error()));
        poller
            .expect_poll_account()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|index, credential| Ok(report(index, credential)));
        poller
            .expect_poll_account()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(network_error()));

        let shutdown = Shutdown::new();
        let mut task = PollingTask::new(
            Arc::new(poller),
            vec![credential(1, "a b c")],
            settings(),
            shutdown.token(),
        );

        let started = Instant::now();
        let summary = task.run_rounds(4).await;

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 3);
        // 10 + 20 after the failures, 5 after the success
        assert_eq!(started.elapsed(), Duration::from_secs(35));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_pause() {
        let mut poller = MockAccountPoller::new();
        poller
            .expect_poll_account()
            .returning(|index, credential| Ok(report(index, credential)));

        let shutdown = Shutdown::new();
        let mut task = PollingTask::new(
            Arc::new(poller),
            vec![credential(1, "a b c")],
            settings(),
            shutdown.token(),
        );
        let handle = tokio::spawn(async move { task.run().await });

        // polls at t = 0, 5 and 10; shutdown lands mid-pause
        tokio::time::sleep(Duration::from_secs(12)).await;
        shutdown.request(ShutdownSignal::Requested);

        let summary = handle.await.unwrap();
        assert_eq!(summary.succeeded, 3);
    }

    #[tokio::test]
    async fn test_requested_shutdown_polls_nothing() {
        let mut poller = MockAccountPoller::new();
        poller.expect_poll_account().never();

        let shutdown = Shutdown::new();
        shutdown.request(ShutdownSignal::Interrupt);
        let mut task = PollingTask::new(
            Arc::new(poller),
            vec![credential(1, "a b c")],
            settings(),
            shutdown.token(),
        );

        assert_eq!(task.run().await, PollSummary::default());
    }

    #[tokio::test]
    async fn test_no_pollable_credentials_returns_immediately() {
        let poller = MockAccountPoller::new();
        let shutdown = Shutdown::new();
        let mut task = PollingTask::new(
            Arc::new(poller),
            vec![credential(1, "")],
            settings(),
            shutdown.token(),
        );
        assert_eq!(task.run().await.rounds, 0);
    }
}
