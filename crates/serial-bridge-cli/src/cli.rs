//! Command-line interface definitions and parsing

use clap::{Parser, Subcommand};
use serial_bridge_core::{BridgeConfig, BridgeMode};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Duplex byte bridge over a serial-like channel", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Channel address (host:port of a serial-over-TCP endpoint)
    #[arg(short, long)]
    pub address: Option<String>,

    /// Symbol rate in baud
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Use an in-memory loopback channel instead of TCP
    #[arg(long)]
    pub loopback: bool,

    /// Disable all pacing delays
    #[arg(long)]
    pub no_pacing: bool,

    /// Stop the session after this many seconds
    #[arg(short, long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Transmit the source and log everything received (default)
    Duplex,
    /// Transmit the source, then close the channel
    Transmit,
    /// Only log received bytes
    Receive,
}

impl From<Commands> for BridgeMode {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Duplex => BridgeMode::Duplex,
            Commands::Transmit => BridgeMode::Transmit,
            Commands::Receive => BridgeMode::Receive,
        }
    }
}

impl Cli {
    /// Fold command-line overrides into a loaded configuration
    pub fn apply(&self, config: &mut BridgeConfig) {
        if let Some(command) = self.command {
            config.mode = command.into();
        }
        if let Some(address) = &self.address {
            config.channel.address = address.clone();
        }
        if let Some(baud) = self.baud {
            config.channel.baud_rate = baud;
        }
        if self.no_pacing {
            config.pacing.enabled = false;
        }
        if let Some(secs) = self.timeout_secs {
            config.session_timeout_ms = Some(secs.saturating_mul(1000));
        }
    }
}
