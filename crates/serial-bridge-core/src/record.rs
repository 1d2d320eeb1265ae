//! Log record types
//!
//! A record renders to exactly one line (without the trailing newline).
//! Control characters in the character column are written escaped (`\n`,
//! `\u{85}`) so a received byte can never split a line.

use crate::codec::{self, ByteValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A byte pulled from the channel, expanded into its representations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedUnit {
    /// Raw byte rendered as two hex digits
    pub hex: String,
    /// Decimal value
    pub value: ByteValue,
    /// 8-bit binary string
    pub binary: String,
    /// Character interpretation
    pub character: char,
}

impl ReceivedUnit {
    pub fn from_byte(byte: u8) -> Self {
        let value = codec::decode([byte]);
        Self {
            hex: codec::to_hex(value),
            value,
            binary: codec::to_binary_string(value),
            character: codec::to_character(value),
        }
    }
}

/// How reception records are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceptionFormat {
    /// Hex, binary, decimal and character on one line
    #[default]
    Full,
    /// Only the character, one per line
    Character,
}

/// One append-only log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    Transmitted(ByteValue),
    TransmittedLiteral(u8),
    Received {
        unit: ReceivedUnit,
        format: ReceptionFormat,
    },
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogRecord::Transmitted(value) => write!(f, "Transmitted Decimal: {}", value),
            LogRecord::TransmittedLiteral(code) => write!(f, "Transmitted Literal: {}", code),
            LogRecord::Received {
                unit,
                format: ReceptionFormat::Full,
            } => write!(
                f,
                "Hex: {}, Binary: {}, Decimal: {}, ASCII: {}",
                unit.hex,
                unit.binary,
                unit.value,
                Printable(unit.character)
            ),
            LogRecord::Received {
                unit,
                format: ReceptionFormat::Character,
            } => write!(f, "{}", Printable(unit.character)),
        }
    }
}

struct Printable(char);

impl fmt::Display for Printable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_control() {
            write!(f, "{}", self.0.escape_default())
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transmit_lines() {
        assert_eq!(
            LogRecord::Transmitted(ByteValue::new(65)).to_string(),
            "Transmitted Decimal: 65"
        );
        assert_eq!(
            LogRecord::TransmittedLiteral(46).to_string(),
            "Transmitted Literal: 46"
        );
    }

    #[test]
    fn test_received_unit_representations() {
        let unit = ReceivedUnit::from_byte(0x42);
        assert_eq!(unit.hex, "42");
        assert_eq!(unit.value.get(), 66);
        assert_eq!(unit.binary, "01000010");
        assert_eq!(unit.character, 'B');
    }

    #[test]
    fn test_received_formats() {
        let unit = ReceivedUnit::from_byte(b'A');
        let full = LogRecord::Received {
            unit: unit.clone(),
            format: ReceptionFormat::Full,
        };
        assert_eq!(
            full.to_string(),
            "Hex: 41, Binary: 01000001, Decimal: 65, ASCII: A"
        );

        let short = LogRecord::Received {
            unit,
            format: ReceptionFormat::Character,
        };
        assert_eq!(short.to_string(), "A");
    }

    #[test]
    fn test_control_bytes_stay_on_one_line() {
        let cases = [
            (0x0a, "\\n"),
            (0x0d, "\\r"),
            (0x00, "\\u{0}"),
            (0x85, "\\u{85}"),
        ];
        for (byte, rendered) in cases {
            let unit = ReceivedUnit::from_byte(byte);
            let full = LogRecord::Received {
                unit: unit.clone(),
                format: ReceptionFormat::Full,
            }
            .to_string();
            assert!(full.ends_with(&format!("ASCII: {}", rendered)), "{}", full);
            assert_eq!(full.lines().count(), 1);

            let short = LogRecord::Received {
                unit,
                format: ReceptionFormat::Character,
            };
            assert_eq!(short.to_string(), rendered);
        }
    }

    #[test]
    fn test_printable_bytes_are_not_escaped() {
        let unit = ReceivedUnit::from_byte(0xe9);
        let short = LogRecord::Received {
            unit,
            format: ReceptionFormat::Character,
        };
        assert_eq!(short.to_string(), "é");
    }

    #[test]
    fn test_reception_format_serde() {
        let fmt: ReceptionFormat = serde_json::from_str("\"character\"").unwrap();
        assert_eq!(fmt, ReceptionFormat::Character);
        assert_eq!(serde_json::to_string(&ReceptionFormat::Full).unwrap(), "\"full\"");
    }
}
