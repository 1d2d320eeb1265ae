//! Bridge configuration
//!
//! A single immutable object handed to the orchestrator at construction.
//! Every section falls back to its defaults when omitted from a config file.

use crate::error::{BridgeError, Result};
use crate::record::ReceptionFormat;
use crate::token::ControlLiteral;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Channel acquisition settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    /// Port identifier or `host:port` of a serial-over-TCP endpoint
    pub address: String,
    /// Symbol rate in baud
    pub baud_rate: u32,
    /// Response timeout, applied while acquiring the channel
    pub response_timeout_ms: u64,
}

impl ChannelSettings {
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:7000".into(),
            baud_rate: 9600,
            response_timeout_ms: 1000,
        }
    }
}

/// Fixed delays used in place of flow control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// When false, all pacing delays are zero
    pub enabled: bool,
    /// Delay before each byte value is written
    pub byte_delay_ms: u64,
    /// Delay before the control literal is written
    pub literal_delay_ms: u64,
    /// Delay after each received byte
    pub receive_delay_ms: u64,
    /// Sleep between polls when nothing is available (not affected by `enabled`)
    pub idle_poll_ms: u64,
}

impl PacingConfig {
    /// No pacing, fast polling
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            idle_poll_ms: 1,
            ..Default::default()
        }
    }

    fn gated(&self, ms: u64) -> Duration {
        if self.enabled {
            Duration::from_millis(ms)
        } else {
            Duration::ZERO
        }
    }

    pub fn byte_delay(&self) -> Duration {
        self.gated(self.byte_delay_ms)
    }

    pub fn literal_delay(&self) -> Duration {
        self.gated(self.literal_delay_ms)
    }

    pub fn receive_delay(&self) -> Duration {
        self.gated(self.receive_delay_ms)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            byte_delay_ms: 400,
            literal_delay_ms: 2000,
            receive_delay_ms: 1000,
            idle_poll_ms: 10,
        }
    }
}

/// Source and log locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Line-oriented token source
    pub data_file: PathBuf,
    /// Reception log
    pub output_file: PathBuf,
    /// Transmission log; `None` disables it
    pub transmission_log: Option<PathBuf>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            data_file: "data.txt".into(),
            output_file: "received_data.txt".into(),
            transmission_log: Some("transmission_log.txt".into()),
        }
    }
}

/// Which directions a session runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeMode {
    #[default]
    Duplex,
    Transmit,
    Receive,
}

impl BridgeMode {
    pub fn transmits(self) -> bool {
        matches!(self, BridgeMode::Duplex | BridgeMode::Transmit)
    }

    pub fn receives(self) -> bool {
        matches!(self, BridgeMode::Duplex | BridgeMode::Receive)
    }
}

/// Complete bridge configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub channel: ChannelSettings,
    pub pacing: PacingConfig,
    /// `None` disables control literal recognition
    pub control_literal: Option<ControlLiteral>,
    pub files: FileConfig,
    pub reception_format: ReceptionFormat,
    pub mode: BridgeMode,
    /// Cancel the session after this long; unlimited when absent
    pub session_timeout_ms: Option<u64>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            channel: ChannelSettings::default(),
            pacing: PacingConfig::default(),
            control_literal: Some(ControlLiteral::period()),
            files: FileConfig::default(),
            reception_format: ReceptionFormat::Full,
            mode: BridgeMode::Duplex,
            session_timeout_ms: None,
        }
    }
}

impl BridgeConfig {
    /// Load from a JSON file and validate
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: BridgeConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.channel.address.trim().is_empty() {
            return Err(BridgeError::Config("Channel address must not be empty".into()));
        }
        if self.channel.baud_rate == 0 {
            return Err(BridgeError::Config("Baud rate must be greater than 0".into()));
        }
        if self.pacing.idle_poll_ms == 0 {
            return Err(BridgeError::Config(
                "Idle poll interval must be greater than 0".into(),
            ));
        }
        if let Some(lit) = &self.control_literal {
            if lit.text.trim().is_empty() || lit.text.trim() != lit.text {
                return Err(BridgeError::Config(format!(
                    "Control literal {:?} must be non-empty without surrounding whitespace",
                    lit.text
                )));
            }
            // Would be shadowed by numeric parsing
            if lit.text.bytes().all(|b| b.is_ascii_digit()) {
                return Err(BridgeError::Config(format!(
                    "Control literal {:?} must not be numeric",
                    lit.text
                )));
            }
        }
        Ok(())
    }

    pub fn session_timeout(&self) -> Option<Duration> {
        self.session_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_reference_setup() {
        let config = BridgeConfig::default();
        assert_eq!(config.channel.baud_rate, 9600);
        assert_eq!(config.pacing.byte_delay(), Duration::from_millis(400));
        assert_eq!(config.pacing.literal_delay(), Duration::from_secs(2));
        assert_eq!(config.pacing.receive_delay(), Duration::from_secs(1));
        assert_eq!(config.control_literal, Some(ControlLiteral::new(".", 46)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pacing_disabled_zeroes_delays() {
        let pacing = PacingConfig {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(pacing.byte_delay(), Duration::ZERO);
        assert_eq!(pacing.literal_delay(), Duration::ZERO);
        assert_eq!(pacing.receive_delay(), Duration::ZERO);
        assert_eq!(pacing.idle_poll(), Duration::from_millis(10));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"channel": {"address": "/dev/ttyUSB0"}, "mode": "receive", "control_literal": null}"#;
        let config: BridgeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.channel.address, "/dev/ttyUSB0");
        assert_eq!(config.channel.baud_rate, 9600);
        assert_eq!(config.mode, BridgeMode::Receive);
        assert!(config.control_literal.is_none());
        assert_eq!(config.pacing, PacingConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = BridgeConfig::default();
        config.channel.baud_rate = 0;
        assert!(matches!(config.validate(), Err(BridgeError::Config(_))));

        let mut config = BridgeConfig::default();
        config.control_literal = Some(ControlLiteral::new("12", 12));
        assert!(matches!(config.validate(), Err(BridgeError::Config(_))));

        let mut config = BridgeConfig::default();
        config.control_literal = Some(ControlLiteral::new(" ", 32));
        assert!(config.validate().is_err());

        let mut config = BridgeConfig::default();
        config.pacing.idle_poll_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"pacing": {{"enabled": false}}, "session_timeout_ms": 5000}}"#
        )
        .unwrap();

        let config = BridgeConfig::load_from_file(file.path()).unwrap();
        assert!(!config.pacing.enabled);
        assert_eq!(config.session_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = BridgeConfig::load_from_file("/nonexistent/serial-bridge.json").unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[test]
    fn test_mode_directions() {
        assert!(BridgeMode::Duplex.transmits() && BridgeMode::Duplex.receives());
        assert!(BridgeMode::Transmit.transmits() && !BridgeMode::Transmit.receives());
        assert!(!BridgeMode::Receive.transmits() && BridgeMode::Receive.receives());
    }
}
