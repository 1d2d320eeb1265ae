//! Receive side of the bridge
//!
//! Polls the channel without blocking and logs every byte that arrives.
//! There is no natural end: the loop stops on cancellation or on the first
//! channel or log error.

use crate::channel::Channel;
use crate::lifecycle::{Shutdown, TaskOutcome};
use crate::sink::RecordSink;
use serial_bridge_core::{LogRecord, PacingConfig, ReceivedUnit, ReceptionFormat, Result};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Summary of one receiver run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveReport {
    /// Bytes read and logged
    pub received: usize,
    pub outcome: TaskOutcome,
}

impl ReceiveReport {
    pub fn skipped() -> Self {
        Self {
            received: 0,
            outcome: TaskOutcome::Skipped,
        }
    }
}

pub struct Receiver {
    channel: Arc<dyn Channel>,
    pacing: PacingConfig,
    format: ReceptionFormat,
    shutdown: Shutdown,
}

impl Receiver {
    pub fn new(
        channel: Arc<dyn Channel>,
        pacing: PacingConfig,
        format: ReceptionFormat,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            channel,
            pacing,
            format,
            shutdown,
        }
    }

    /// Listen until cancelled or a terminal error occurs
    pub async fn run(mut self, mut log: Box<dyn RecordSink>) -> ReceiveReport {
        let mut received = 0;

        let outcome = match self.receive(log.as_mut(), &mut received).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Error during reception: {}", e);
                TaskOutcome::Failed(e)
            }
        };

        info!("Receiver finished: {} received ({:?})", received, outcome);
        ReceiveReport { received, outcome }
    }

    async fn receive(
        &mut self,
        log: &mut dyn RecordSink,
        received: &mut usize,
    ) -> Result<TaskOutcome> {
        log.open().await?;
        info!("Listening for channel data...");

        loop {
            if self.shutdown.is_requested() {
                return Ok(TaskOutcome::Cancelled);
            }

            let Some(byte) = self.channel.read_available().await? else {
                if self.shutdown.sleep(self.pacing.idle_poll()).await {
                    return Ok(TaskOutcome::Cancelled);
                }
                continue;
            };

            let unit = ReceivedUnit::from_byte(byte);
            info!(
                "Received Binary: {}, Decimal: {}, ASCII: {:?}",
                unit.binary, unit.value, unit.character
            );
            log.append(&LogRecord::Received {
                unit,
                format: self.format,
            })
            .await?;
            *received += 1;
            debug!("Logged byte #{}", received);

            if self.shutdown.sleep(self.pacing.receive_delay()).await {
                return Ok(TaskOutcome::Cancelled);
            }
        }
    }
}
