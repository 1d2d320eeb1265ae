//! Channel abstractions
//!
//! The channel is an opaque duplex byte pipe. The transmitter only ever
//! writes and the receiver only ever reads, so implementations guard each
//! direction independently and both sides can share one `Arc<dyn Channel>`.

use async_trait::async_trait;
use serial_bridge_core::{ChannelSettings, Result};
use std::sync::Arc;

/// Duplex single-byte transport
#[async_trait]
pub trait Channel: Send + Sync {
    /// Write one byte, completing once it has been handed to the transport
    async fn write_byte(&self, byte: u8) -> Result<()>;

    /// Return the next pending byte, or `None` if nothing has arrived.
    /// Never waits for data.
    async fn read_available(&self) -> Result<Option<u8>>;

    /// Release the underlying transport. Only the orchestrator calls this.
    async fn close(&self) -> Result<()>;

    /// Whether the channel has not been closed yet
    fn is_open(&self) -> bool;
}

/// Acquires a channel for a session
#[async_trait]
pub trait ChannelOpener: Send + Sync {
    async fn open(&self, settings: &ChannelSettings) -> Result<Arc<dyn Channel>>;
}
