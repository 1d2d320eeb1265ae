//! Source line classification

use crate::codec::ByteValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-numeric marker given a fixed byte encoding and its own pacing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlLiteral {
    /// Text that must match a trimmed source line exactly
    pub text: String,
    /// Byte written to the channel when the literal is seen
    pub byte: u8,
}

impl ControlLiteral {
    pub fn new(text: impl Into<String>, byte: u8) -> Self {
        Self {
            text: text.into(),
            byte,
        }
    }

    /// The single-character literal `.` sent as its ASCII code (46)
    pub fn period() -> Self {
        Self::new(".", b'.')
    }
}

impl Default for ControlLiteral {
    fn default() -> Self {
        Self::period()
    }
}

/// Why a line was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// All digits, but the integer does not fit in a byte
    OutOfRange,
    /// Neither a number nor the control literal
    Unrecognized,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::OutOfRange => write!(f, "out of range (0-255)"),
            InvalidReason::Unrecognized => write!(f, "unrecognized input"),
        }
    }
}

/// One parsed source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Decimal value in 0..=255
    Byte(ByteValue),
    /// The configured control literal; carries the byte to send
    Literal(u8),
    /// Rejected line, trimmed
    Invalid { text: String, reason: InvalidReason },
}

impl Token {
    /// Classify a raw line. `literal` is `None` when the control literal is disabled.
    pub fn parse(line: &str, literal: Option<&ControlLiteral>) -> Self {
        let trimmed = line.trim();

        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            // Overflowing u64 is still "a number that doesn't fit"
            return match trimmed.parse::<u64>().ok().map(ByteValue::try_from) {
                Some(Ok(value)) => Token::Byte(value),
                _ => Token::Invalid {
                    text: trimmed.to_string(),
                    reason: InvalidReason::OutOfRange,
                },
            };
        }

        match literal {
            Some(lit) if trimmed == lit.text => Token::Literal(lit.byte),
            _ => Token::Invalid {
                text: trimmed.to_string(),
                reason: InvalidReason::Unrecognized,
            },
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Token::Invalid { .. })
    }
}
