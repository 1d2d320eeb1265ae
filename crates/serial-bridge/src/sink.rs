//! Record sinks for the transmission and reception logs
//!
//! Sinks are append-only. Each append is flushed before it returns, so a
//! crash loses at most the record being written.

use async_trait::async_trait;
use serial_bridge_core::{BridgeError, LogRecord, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Append-only, line-oriented log
#[async_trait]
pub trait RecordSink: Send {
    /// Acquire the underlying log
    async fn open(&mut self) -> Result<()> {
        Ok(())
    }

    /// Append one record as one line and flush it
    async fn append(&mut self, record: &LogRecord) -> Result<()>;
}

/// Log file, truncated when opened
pub struct FileSink {
    path: PathBuf,
    file: Option<File>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }
}

#[async_trait]
impl RecordSink for FileSink {
    async fn open(&mut self) -> Result<()> {
        let file = File::create(&self.path).await.map_err(|e| {
            BridgeError::LogUnavailable(format!("Failed to create {}: {}", self.path.display(), e))
        })?;
        self.file = Some(file);
        Ok(())
    }

    async fn append(&mut self, record: &LogRecord) -> Result<()> {
        let file = self.file.as_mut().ok_or_else(|| {
            BridgeError::LogWrite(format!("{} not opened", self.path.display()))
        })?;

        let line = format!("{}\n", record);
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| BridgeError::LogWrite(format!("{}: {}", self.path.display(), e)))?;

        // Write-through: don't return until the OS has the record
        file.flush()
            .await
            .map_err(|e| BridgeError::LogWrite(format!("{}: {}", self.path.display(), e)))?;

        Ok(())
    }
}

/// Shared in-memory log; clones append to the same buffer
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all lines appended so far
    pub async fn lines(&self) -> Vec<String> {
        self.lines.lock().await.clone()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn append(&mut self, record: &LogRecord) -> Result<()> {
        self.lines.lock().await.push(record.to_string());
        Ok(())
    }
}

/// Drops every record (transmission log disabled)
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

#[async_trait]
impl RecordSink for DiscardSink {
    async fn append(&mut self, _record: &LogRecord) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_bridge_core::{ByteValue, ReceivedUnit, ReceptionFormat};

    #[tokio::test]
    async fn test_file_sink_writes_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transmission_log.txt");

        let mut sink = FileSink::new(&path);
        sink.open().await.unwrap();
        sink.append(&LogRecord::Transmitted(ByteValue::new(65)))
            .await
            .unwrap();

        // Visible before the sink is dropped
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "Transmitted Decimal: 65\n");

        sink.append(&LogRecord::TransmittedLiteral(46)).await.unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "Transmitted Decimal: 65\nTransmitted Literal: 46\n");
    }

    #[tokio::test]
    async fn test_file_sink_truncates_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("received_data.txt");
        std::fs::write(&path, "stale\n").unwrap();

        let mut sink = FileSink::new(&path);
        sink.open().await.unwrap();
        sink.append(&LogRecord::Received {
            unit: ReceivedUnit::from_byte(b'Z'),
            format: ReceptionFormat::Character,
        })
        .await
        .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Z\n");
    }

    #[tokio::test]
    async fn test_file_sink_newline_byte_is_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("received_data.txt");

        let mut sink = FileSink::new(&path);
        sink.open().await.unwrap();
        for byte in [0x0a, 0x0d, b'A'] {
            sink.append(&LogRecord::Received {
                unit: ReceivedUnit::from_byte(byte),
                format: ReceptionFormat::Full,
            })
            .await
            .unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 3);
        assert_eq!(
            contents.lines().next(),
            Some("Hex: 0a, Binary: 00001010, Decimal: 10, ASCII: \\n")
        );
    }

    #[tokio::test]
    async fn test_file_sink_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(dir.path().join("missing").join("log.txt"));
        let err = sink.open().await.unwrap_err();
        assert!(matches!(err, BridgeError::LogUnavailable(_)));
    }

    #[tokio::test]
    async fn test_memory_sink_shares_buffer() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer
            .append(&LogRecord::Transmitted(ByteValue::new(5)))
            .await
            .unwrap();
        assert_eq!(sink.lines().await, vec!["Transmitted Decimal: 5"]);
    }
}
