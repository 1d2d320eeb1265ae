//! serial-bridge: duplex byte bridge
//!
//! Reads decimal values from the data file and writes them as single bytes
//! to the channel, while logging every byte that arrives on it.
//! Runs until the session timeout or Ctrl+C (transmit mode stops on its own
//! once the data file is exhausted).

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use serial_bridge::{ChannelOpener, LoopbackOpener, SerialBridge, SessionIo, TcpOpener};
use serial_bridge_core::BridgeConfig;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    setup_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            BridgeConfig::load_from_file(path)
                .with_context(|| format!("Invalid configuration in {}", path.display()))?
        }
        None => BridgeConfig::default(),
    };
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let io = SessionIo::from_files(&config.files);
    let opener: Box<dyn ChannelOpener> = if cli.loopback {
        info!("Using in-memory loopback channel");
        Box::new(LoopbackOpener::default())
    } else {
        Box::new(TcpOpener)
    };

    let mut bridge = SerialBridge::new(config);
    info!(
        "Starting {:?} session on {}",
        bridge.config().mode,
        bridge.config().channel.address
    );

    let stop = bridge.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Terminated by user");
            stop.trigger();
        }
    });

    bridge
        .open(opener.as_ref())
        .await
        .context("Failed to open channel")?;

    let summary = bridge.run(io).await.context("Session failed")?;

    info!(
        "Transmitter: {:?}, {} sent, {} rejected",
        summary.transmit.outcome,
        summary.transmit.sent,
        summary.transmit.rejected.len()
    );
    for rejected in &summary.transmit.rejected {
        warn!("  {}", rejected);
    }
    info!(
        "Receiver: {:?}, {} received",
        summary.receive.outcome, summary.receive.received
    );

    if !summary.is_clean() {
        error!("Session ended with errors");
        anyhow::bail!("Session ended with errors");
    }
    Ok(())
}

/// `RUST_LOG` wins; otherwise info, or debug with --verbose
fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
