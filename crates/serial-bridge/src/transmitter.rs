//! Transmit side of the bridge
//!
//! Drains a token source in order, writing one byte per accepted token.
//! Rejected lines are reported and skipped. The first channel or log error
//! ends the task; remaining tokens are not attempted.

use crate::channel::Channel;
use crate::lifecycle::{Shutdown, TaskOutcome};
use crate::sink::RecordSink;
use crate::source::TokenSource;
use serial_bridge_core::{
    BridgeError, ByteValue, ControlLiteral, LogRecord, PacingConfig, Result, Token, codec,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Summary of one transmitter run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmitReport {
    /// Bytes written to the channel (literals included)
    pub sent: usize,
    /// How many of those were the control literal
    pub literals: usize,
    /// `BridgeError::InvalidToken` for every skipped line
    pub rejected: Vec<BridgeError>,
    pub outcome: TaskOutcome,
}

impl TransmitReport {
    fn new() -> Self {
        Self {
            sent: 0,
            literals: 0,
            rejected: Vec::new(),
            outcome: TaskOutcome::Completed,
        }
    }

    pub fn skipped() -> Self {
        Self {
            outcome: TaskOutcome::Skipped,
            ..Self::new()
        }
    }
}

pub struct Transmitter {
    channel: Arc<dyn Channel>,
    pacing: PacingConfig,
    literal: Option<ControlLiteral>,
    shutdown: Shutdown,
}

impl Transmitter {
    pub fn new(
        channel: Arc<dyn Channel>,
        pacing: PacingConfig,
        literal: Option<ControlLiteral>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            channel,
            pacing,
            literal,
            shutdown,
        }
    }

    /// Run to completion, cancellation or the first terminal error
    pub async fn run(
        mut self,
        mut source: Box<dyn TokenSource>,
        mut log: Box<dyn RecordSink>,
    ) -> TransmitReport {
        let mut report = TransmitReport::new();

        report.outcome = match self
            .transmit(source.as_mut(), log.as_mut(), &mut report)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Error during transmission: {}", e);
                TaskOutcome::Failed(e)
            }
        };

        info!(
            "Transmitter finished: {} sent, {} rejected ({:?})",
            report.sent,
            report.rejected.len(),
            report.outcome
        );
        report
    }

    async fn transmit(
        &mut self,
        source: &mut dyn TokenSource,
        log: &mut dyn RecordSink,
        report: &mut TransmitReport,
    ) -> Result<TaskOutcome> {
        source.open().await?;
        log.open().await?;

        let mut line_no = 0;
        loop {
            if self.shutdown.is_requested() {
                return Ok(TaskOutcome::Cancelled);
            }

            let Some(line) = source.next_line().await? else {
                break;
            };
            line_no += 1;

            match Token::parse(&line, self.literal.as_ref()) {
                Token::Invalid { text, reason } => {
                    let err = BridgeError::InvalidToken {
                        line: line_no,
                        text,
                        reason,
                    };
                    warn!("Ignoring input: {}", err);
                    report.rejected.push(err);
                }
                Token::Byte(value) => {
                    if !self.send(value, self.pacing.byte_delay()).await? {
                        return Ok(TaskOutcome::Cancelled);
                    }
                    info!(
                        "Transmitted: {} (Decimal: {})",
                        codec::to_binary_string(value),
                        value
                    );
                    log.append(&LogRecord::Transmitted(value)).await?;
                    report.sent += 1;
                }
                Token::Literal(code) => {
                    let value = ByteValue::new(code);
                    if !self.send(value, self.pacing.literal_delay()).await? {
                        return Ok(TaskOutcome::Cancelled);
                    }
                    info!(
                        "Transmitted: {} (Literal: {})",
                        codec::to_binary_string(value),
                        code
                    );
                    log.append(&LogRecord::TransmittedLiteral(code)).await?;
                    report.sent += 1;
                    report.literals += 1;
                }
            }
        }

        debug!("Token source exhausted after {} lines", line_no);
        Ok(TaskOutcome::Completed)
    }

    /// Pace, then write. Returns false if stopped during the delay.
    async fn send(&mut self, value: ByteValue, delay: Duration) -> Result<bool> {
        if self.shutdown.sleep(delay).await {
            return Ok(false);
        }
        let [byte] = codec::encode(value);
        self.channel.write_byte(byte).await?;
        Ok(true)
    }
}
