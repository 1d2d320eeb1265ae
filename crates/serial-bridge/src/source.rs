//! Token sources
//!
//! Sequential, line-oriented input consumed once front to back.

use async_trait::async_trait;
use serial_bridge_core::{BridgeError, Result};
use std::collections::VecDeque;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Line-oriented token input
#[async_trait]
pub trait TokenSource: Send {
    /// Acquire the underlying input. Failure means nothing is transmitted.
    async fn open(&mut self) -> Result<()> {
        Ok(())
    }

    /// Next raw line without its terminator, `None` when exhausted
    async fn next_line(&mut self) -> Result<Option<String>>;
}

/// Lines of a text file. Bytes that are not UTF-8 become U+FFFD, so such a
/// line reaches the classifier instead of ending the read.
pub struct FileSource {
    path: PathBuf,
    reader: Option<BufReader<File>>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reader: None,
        }
    }
}

#[async_trait]
impl TokenSource for FileSource {
    async fn open(&mut self) -> Result<()> {
        let file = File::open(&self.path).await.map_err(|e| {
            BridgeError::SourceUnavailable(format!(
                "Failed to open {}: {}",
                self.path.display(),
                e
            ))
        })?;
        self.reader = Some(BufReader::new(file));
        Ok(())
    }

    async fn next_line(&mut self) -> Result<Option<String>> {
        let reader = self.reader.as_mut().ok_or_else(|| {
            BridgeError::SourceUnavailable(format!("{} not opened", self.path.display()))
        })?;

        let mut buf = Vec::new();
        let read = reader.read_until(b'\n', &mut buf).await.map_err(|e| {
            BridgeError::SourceUnavailable(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))
        })?;
        if read == 0 {
            return Ok(None);
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}

/// In-memory lines
#[derive(Debug, Clone, Default)]
pub struct LineSource {
    lines: VecDeque<String>,
}

impl LineSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl TokenSource for LineSource {
    async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_source_reads_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "65\r\nfoo\n66").unwrap();

        let mut source = FileSource::new(file.path());
        source.open().await.unwrap();
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("65"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("foo"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("66"));
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_source_keeps_reading_past_bad_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"65\n\xff\xfe\n66\n").unwrap();

        let mut source = FileSource::new(file.path());
        source.open().await.unwrap();
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("65"));
        assert_eq!(
            source.next_line().await.unwrap().as_deref(),
            Some("\u{fffd}\u{fffd}")
        );
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("66"));
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FileSource::new(dir.path().join("data.txt"));
        let err = source.open().await.unwrap_err();
        assert!(matches!(err, BridgeError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_line_source_drains_in_order() {
        let mut source = LineSource::new(["5", "10"]);
        source.open().await.unwrap();
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("5"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("10"));
        assert_eq!(source.next_line().await.unwrap(), None);
    }
}
