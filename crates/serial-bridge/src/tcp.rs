//! TCP channel implementation
//!
//! Used for serial ports exposed over raw TCP (ser2net, socat, device
//! servers). Line settings such as the baud rate live on the serving side.

use crate::channel::{Channel, ChannelOpener};
use async_trait::async_trait;
use serial_bridge_core::{BridgeError, ChannelSettings, Result};
use std::io::ErrorKind;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Byte pipe over a TCP connection, one mutex per direction
pub struct TcpChannel {
    peer: String,
    reader: Mutex<Option<OwnedReadHalf>>,
    writer: Mutex<Option<OwnedWriteHalf>>,
    open: AtomicBool,
}

impl TcpChannel {
    pub fn new(stream: TcpStream, peer: impl Into<String>) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            peer: peer.into(),
            reader: Mutex::new(Some(read_half)),
            writer: Mutex::new(Some(write_half)),
            open: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl Channel for TcpChannel {
    async fn write_byte(&self, byte: u8) -> Result<()> {
        let mut guard = self.writer.lock().await;
        let writer = guard
            .as_mut()
            .ok_or_else(|| BridgeError::ChannelIo("TCP channel closed".into()))?;

        writer
            .write_all(&[byte])
            .await
            .map_err(|e| BridgeError::ChannelIo(format!("TCP write failed: {}", e)))?;

        // Flush to ensure the byte is sent
        writer
            .flush()
            .await
            .map_err(|e| BridgeError::ChannelIo(format!("TCP flush failed: {}", e)))?;

        Ok(())
    }

    async fn read_available(&self) -> Result<Option<u8>> {
        let guard = self.reader.lock().await;
        let reader = guard
            .as_ref()
            .ok_or_else(|| BridgeError::ChannelIo("TCP channel closed".into()))?;

        let mut buf = [0u8; 1];
        match reader.try_read(&mut buf) {
            Ok(0) => Err(BridgeError::ChannelIo(format!(
                "Connection to {} closed by peer",
                self.peer
            ))),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(BridgeError::ChannelIo(format!("TCP read failed: {}", e))),
        }
    }

    async fn close(&self) -> Result<()> {
        if !self.open.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        let writer = self.writer.lock().await.take();
        self.reader.lock().await.take();

        // Both halves are released even when the shutdown fails
        if let Some(mut writer) = writer {
            writer.shutdown().await.map_err(|e| {
                BridgeError::ChannelIo(format!(
                    "Failed to close connection to {}: {}",
                    self.peer, e
                ))
            })?;
        }
        debug!("TCP channel to {} closed", self.peer);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

/// Connects a [`TcpChannel`] to `settings.address`
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpOpener;

#[async_trait]
impl ChannelOpener for TcpOpener {
    async fn open(&self, settings: &ChannelSettings) -> Result<Arc<dyn Channel>> {
        let addr = settings.address.as_str();
        info!("Connecting to {} ({} baud)", addr, settings.baud_rate);

        // Connect with timeout
        let stream = tokio::time::timeout(settings.response_timeout(), TcpStream::connect(addr))
            .await
            .map_err(|_| BridgeError::ChannelOpen(format!("Connection timeout to {}", addr)))?
            .map_err(|e| {
                BridgeError::ChannelOpen(format!("Failed to connect to {}: {}", addr, e))
            })?;

        // Single bytes must not sit in Nagle's buffer
        stream
            .set_nodelay(true)
            .map_err(|e| BridgeError::ChannelOpen(format!("Failed to set TCP_NODELAY: {}", e)))?;

        Ok(Arc::new(TcpChannel::new(stream, addr)))
    }
}
