//! # serial-bridge-core
//!
//! Core types for the serial byte bridge.
//!
//! This crate provides the pieces that do not depend on an async runtime:
//! - Single-byte value codec and its textual renderings
//! - Source line classification into tokens
//! - Transmission and reception log records
//! - Bridge configuration
//! - Error taxonomy

pub mod codec;
pub mod config;
pub mod error;
pub mod record;
pub mod token;

pub use codec::ByteValue;
pub use config::{BridgeConfig, BridgeMode, ChannelSettings, FileConfig, PacingConfig};
pub use error::{BridgeError, Result};
pub use record::{LogRecord, ReceivedUnit, ReceptionFormat};
pub use token::{ControlLiteral, InvalidReason, Token};
