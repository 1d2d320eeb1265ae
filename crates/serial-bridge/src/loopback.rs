//! In-memory loopback channel
//!
//! Behaves like a serial port with TX wired to RX: every byte written comes
//! back on the read side. Also records every write and close call so that
//! sessions can be inspected afterwards.

use crate::channel::{Channel, ChannelOpener};
use async_trait::async_trait;
use serial_bridge_core::{BridgeError, ChannelSettings, Result};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

pub struct LoopbackChannel {
    inbound: Mutex<VecDeque<u8>>,
    written: Mutex<Vec<u8>>,
    /// Feed writes back to the read side
    echo: bool,
    /// Fail every write after this many have succeeded
    fail_after: Option<usize>,
    /// Report an error from the first close
    fail_close: bool,
    open: AtomicBool,
    close_calls: AtomicUsize,
}

impl LoopbackChannel {
    /// TX looped to RX
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Writes are recorded but never read back; use [`inject`](Self::inject) to feed RX
    pub fn unlooped() -> Self {
        Self::build(false)
    }

    fn build(echo: bool) -> Self {
        Self {
            inbound: Mutex::new(VecDeque::new()),
            written: Mutex::new(Vec::new()),
            echo,
            fail_after: None,
            fail_close: false,
            open: AtomicBool::new(true),
            close_calls: AtomicUsize::new(0),
        }
    }

    /// Make writes fail once `count` writes have gone through
    pub fn fail_writes_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Make the first close report a transport error
    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Queue bytes on the read side as if they arrived from the wire
    pub async fn inject(&self, bytes: &[u8]) {
        self.inbound.lock().await.extend(bytes.iter().copied());
    }

    /// Every byte successfully written so far, in order
    pub async fn written(&self) -> Vec<u8> {
        self.written.lock().await.clone()
    }

    /// How many times `close` was called
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

impl Default for LoopbackChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Channel for LoopbackChannel {
    async fn write_byte(&self, byte: u8) -> Result<()> {
        if !self.is_open() {
            return Err(BridgeError::ChannelIo("Loopback channel closed".into()));
        }

        let mut written = self.written.lock().await;
        if self.fail_after.is_some_and(|limit| written.len() >= limit) {
            return Err(BridgeError::ChannelIo(format!(
                "Loopback write {} rejected",
                written.len() + 1
            )));
        }
        written.push(byte);

        if self.echo {
            self.inbound.lock().await.push_back(byte);
        }
        Ok(())
    }

    async fn read_available(&self) -> Result<Option<u8>> {
        if !self.is_open() {
            return Err(BridgeError::ChannelIo("Loopback channel closed".into()));
        }
        Ok(self.inbound.lock().await.pop_front())
    }

    async fn close(&self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        if self.open.swap(false, Ordering::SeqCst) {
            debug!("Loopback channel closed");
            if self.fail_close {
                return Err(BridgeError::ChannelIo("Loopback close rejected".into()));
            }
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

/// Hands out one shared [`LoopbackChannel`]
#[derive(Clone)]
pub struct LoopbackOpener {
    channel: Arc<LoopbackChannel>,
}

impl LoopbackOpener {
    pub fn new(channel: Arc<LoopbackChannel>) -> Self {
        Self { channel }
    }

    /// The channel handed out by `open`, for inspection
    pub fn channel(&self) -> Arc<LoopbackChannel> {
        self.channel.clone()
    }
}

impl Default for LoopbackOpener {
    fn default() -> Self {
        Self::new(Arc::new(LoopbackChannel::new()))
    }
}

#[async_trait]
impl ChannelOpener for LoopbackOpener {
    async fn open(&self, settings: &ChannelSettings) -> Result<Arc<dyn Channel>> {
        debug!("Opening loopback channel for {}", settings.address);
        if !self.channel.is_open() {
            return Err(BridgeError::ChannelOpen(
                "Loopback channel already closed".into(),
            ));
        }
        Ok(self.channel.clone())
    }
}
