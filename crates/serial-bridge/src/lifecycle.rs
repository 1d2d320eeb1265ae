//! Cancellation signal and task outcomes

use serial_bridge_core::BridgeError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Create a linked stop handle and signal
pub fn shutdown_channel() -> (ShutdownHandle, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle { tx: Arc::new(tx) }, Shutdown { rx })
}

/// Requests a stop; cloneable so it can be handed to signal handlers
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// A new signal observing this handle
    pub fn subscribe(&self) -> Shutdown {
        Shutdown {
            rx: self.tx.subscribe(),
        }
    }
}

/// Observed by bridge tasks at each loop head and during every sleep
#[derive(Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn is_requested(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once a stop is requested. Never resolves if every handle is gone.
    pub async fn requested(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Sleep for `duration` unless a stop arrives first. Returns true if stopped.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        if duration.is_zero() {
            return self.is_requested();
        }
        let stopped = tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = self.requested() => true,
        };
        stopped || self.is_requested()
    }
}

/// How a bridge task ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Ran to its natural end (source exhausted)
    Completed,
    /// Stopped on request
    Cancelled,
    /// Stopped by an error
    Failed(BridgeError),
    /// Not started for this session's mode
    Skipped,
}

impl TaskOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, TaskOutcome::Failed(_))
    }
}
