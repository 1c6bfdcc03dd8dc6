//! Shutdown signalling
//!
//! A single watch channel carries the first shutdown request to every task
//! holding a [`ShutdownToken`]. Later requests are ignored.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Shutdown signal types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGINT / Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
    /// Requested from code, e.g. a bounded run finished
    Requested,
}

impl std::fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownSignal::Interrupt => write!(f, "interrupt"),
            ShutdownSignal::Terminate => write!(f, "terminate"),
            ShutdownSignal::Requested => write!(f, "requested"),
        }
    }
}

/// Owner side of the shutdown channel
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<Option<ShutdownSignal>>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Request shutdown. Returns false if one was already requested.
    pub fn request(&self, signal: ShutdownSignal) -> bool {
        let accepted = self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(signal);
            true
        });
        if accepted {
            info!("Shutdown requested ({})", signal);
        }
        accepted
    }

    pub fn is_requested(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn token(&self) -> ShutdownToken {
        ShutdownToken {
            rx: self.tx.subscribe(),
        }
    }
}

/// Token for checking shutdown status in async tasks
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<Option<ShutdownSignal>>,
}

impl ShutdownToken {
    pub fn is_requested(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Resolve once shutdown is requested. Never resolves if the owning
    /// [`Shutdown`] is dropped without a request.
    pub async fn cancelled(&mut self) -> ShutdownSignal {
        let signal = match self.rx.wait_for(Option::is_some).await {
            Ok(signal) => *signal,
            Err(_) => None,
        };
        match signal {
            Some(signal) => signal,
            None => std::future::pending().await,
        }
    }
}
