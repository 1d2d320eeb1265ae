//! Error types for serial-bridge

use thiserror::Error;

/// Result type for serial-bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// serial-bridge error types
///
/// Variants carry rendered messages rather than source errors so that task
/// outcomes can be cloned into session summaries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// Malformed or out-of-range source line
    #[error("Invalid token on line {line}: {reason} ({text:?})")]
    InvalidToken {
        line: usize,
        text: String,
        reason: crate::token::InvalidReason,
    },

    /// Token source could not be opened or read
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Channel could not be acquired
    #[error("Channel open error: {0}")]
    ChannelOpen(String),

    /// Read or write failure on an open channel
    #[error("Channel I/O error: {0}")]
    ChannelIo(String),

    /// Record log could not be opened
    #[error("Log unavailable: {0}")]
    LogUnavailable(String),

    /// Record log append or flush failed
    #[error("Log write error: {0}")]
    LogWrite(String),

    /// Configuration rejected
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bridge task panicked or was aborted
    #[error("Task error: {0}")]
    Task(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Config(err.to_string())
    }
}
