//! Duplex byte bridge over a serial-like channel
//!
//! This crate provides:
//! - Channel abstractions (`Channel`/`ChannelOpener` traits)
//! - TCP and in-memory loopback channels
//! - Token sources and append-only record sinks
//! - Transmitter and receiver tasks
//! - The `SerialBridge` orchestrator that owns the channel lifecycle

pub mod bridge;
pub mod channel;
pub mod lifecycle;
pub mod loopback;
pub mod receiver;
pub mod sink;
pub mod source;
pub mod tcp;
pub mod transmitter;

pub use bridge::{BridgeState, SerialBridge, SessionIo, SessionSummary};
pub use channel::{Channel, ChannelOpener};
pub use lifecycle::{Shutdown, ShutdownHandle, TaskOutcome, shutdown_channel};
pub use loopback::{LoopbackChannel, LoopbackOpener};
pub use receiver::{ReceiveReport, Receiver};
pub use sink::{DiscardSink, FileSink, MemorySink, RecordSink};
pub use source::{FileSource, LineSource, TokenSource};
pub use tcp::{TcpChannel, TcpOpener};
pub use transmitter::{TransmitReport, Transmitter};
