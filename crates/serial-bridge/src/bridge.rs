//! Bridge orchestrator
//!
//! Owns the channel for a session: acquires it, runs the transmitter and
//! receiver as independent tasks over it, and releases it exactly once after
//! both tasks have stopped.
//!
//! Lifecycle: `Unopened -> Open -> Closing -> Closed`. A failed open goes
//! straight to `Closed` without starting either task.

use crate::channel::{Channel, ChannelOpener};
use crate::lifecycle::{ShutdownHandle, TaskOutcome, shutdown_channel};
use crate::receiver::{ReceiveReport, Receiver};
use crate::sink::{DiscardSink, FileSink, RecordSink};
use crate::source::{FileSource, TokenSource};
use crate::transmitter::{TransmitReport, Transmitter};
use serial_bridge_core::{BridgeConfig, BridgeError, FileConfig, Result};
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

/// Orchestrator lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Unopened,
    Open,
    Closing,
    Closed,
}

/// Source and logs for one session
pub struct SessionIo {
    pub source: Box<dyn TokenSource>,
    pub transmission_log: Box<dyn RecordSink>,
    pub reception_log: Box<dyn RecordSink>,
}

impl SessionIo {
    pub fn new(
        source: impl TokenSource + 'static,
        transmission_log: impl RecordSink + 'static,
        reception_log: impl RecordSink + 'static,
    ) -> Self {
        Self {
            source: Box::new(source),
            transmission_log: Box::new(transmission_log),
            reception_log: Box::new(reception_log),
        }
    }

    /// File-backed source and logs; a missing transmission log path discards records
    pub fn from_files(files: &FileConfig) -> Self {
        let transmission_log: Box<dyn RecordSink> = match &files.transmission_log {
            Some(path) => Box::new(FileSink::new(path)),
            None => Box::new(DiscardSink),
        };
        Self {
            source: Box::new(FileSource::new(&files.data_file)),
            transmission_log,
            reception_log: Box::new(FileSink::new(&files.output_file)),
        }
    }
}

/// What happened on each side of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub transmit: TransmitReport,
    pub receive: ReceiveReport,
}

impl SessionSummary {
    /// Neither task failed
    pub fn is_clean(&self) -> bool {
        !self.transmit.outcome.is_failure() && !self.receive.outcome.is_failure()
    }
}

pub struct SerialBridge {
    config: BridgeConfig,
    state: BridgeState,
    channel: Option<Arc<dyn Channel>>,
    shutdown: ShutdownHandle,
}

impl SerialBridge {
    pub fn new(config: BridgeConfig) -> Self {
        let (shutdown, _) = shutdown_channel();
        Self {
            config,
            state: BridgeState::Unopened,
            channel: None,
            shutdown,
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Handle that cancels a running session (e.g. from a Ctrl+C handler)
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Acquire the channel. Failure is terminal for this bridge.
    pub async fn open(&mut self, opener: &dyn ChannelOpener) -> Result<()> {
        if self.state != BridgeState::Unopened {
            return Err(BridgeError::ChannelOpen(format!(
                "Bridge cannot be opened from state {:?}",
                self.state
            )));
        }

        match opener.open(&self.config.channel).await {
            Ok(channel) => {
                info!(
                    "Channel established on {} at {} baud",
                    self.config.channel.address, self.config.channel.baud_rate
                );
                self.channel = Some(channel);
                self.state = BridgeState::Open;
                Ok(())
            }
            Err(e) => {
                error!("Failed to open channel: {}", e);
                self.state = BridgeState::Closed;
                Err(e)
            }
        }
    }

    /// Run both directions until they stop, then release the channel
    pub async fn run(&mut self, io: SessionIo) -> Result<SessionSummary> {
        let channel = match (&self.state, &self.channel) {
            (BridgeState::Open, Some(channel)) => channel.clone(),
            _ => {
                return Err(BridgeError::ChannelIo(format!(
                    "Bridge is not open (state {:?})",
                    self.state
                )));
            }
        };

        let mode = self.config.mode;
        info!("Starting {:?} session", mode);

        let tx_handle = mode.transmits().then(|| {
            let transmitter = Transmitter::new(
                channel.clone(),
                self.config.pacing.clone(),
                self.config.control_literal.clone(),
                self.shutdown.subscribe(),
            );
            tokio::spawn(transmitter.run(io.source, io.transmission_log))
        });

        let rx_handle = mode.receives().then(|| {
            let receiver = Receiver::new(
                channel.clone(),
                self.config.pacing.clone(),
                self.config.reception_format,
                self.shutdown.subscribe(),
            );
            tokio::spawn(receiver.run(io.reception_log))
        });
        drop(channel);

        let timer = self.config.session_timeout().map(|limit| {
            let shutdown = self.shutdown.clone();
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                info!("Session timeout of {:?} reached, stopping", limit);
                shutdown.trigger();
            })
        });

        // Both tasks must be fully stopped before the channel is released
        let transmit = match tx_handle {
            Some(handle) => join_task(handle, "transmitter").await.unwrap_or_else(|e| {
                TransmitReport {
                    outcome: TaskOutcome::Failed(e),
                    ..TransmitReport::skipped()
                }
            }),
            None => TransmitReport::skipped(),
        };
        let receive = match rx_handle {
            Some(handle) => join_task(handle, "receiver").await.unwrap_or_else(|e| {
                ReceiveReport {
                    outcome: TaskOutcome::Failed(e),
                    ..ReceiveReport::skipped()
                }
            }),
            None => ReceiveReport::skipped(),
        };

        if let Some(timer) = timer {
            timer.abort();
        }

        self.close().await?;
        Ok(SessionSummary { transmit, receive })
    }

    /// Release the channel. Safe to call any number of times; only the first
    /// call reaches the transport.
    pub async fn close(&mut self) -> Result<()> {
        if self.state == BridgeState::Closed {
            return Ok(());
        }

        self.state = BridgeState::Closing;
        self.shutdown.trigger();

        let result = match self.channel.take() {
            Some(channel) => channel.close().await,
            None => Ok(()),
        };
        self.state = BridgeState::Closed;

        match &result {
            Ok(()) => info!("Channel connection closed"),
            Err(e) => warn!("Channel close reported an error: {}", e),
        }
        result
    }
}

impl Drop for SerialBridge {
    fn drop(&mut self) {
        if self.state == BridgeState::Open {
            warn!("SerialBridge dropped while open; call close() to release the channel");
        }
    }
}

async fn join_task<T>(handle: JoinHandle<T>, name: &str) -> std::result::Result<T, BridgeError> {
    handle.await.map_err(|e: JoinError| {
        error!("{} task did not finish cleanly: {}", name, e);
        BridgeError::Task(format!("{} task: {}", name, e))
    })
}
