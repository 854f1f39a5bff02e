//! Camera viewer (camview-player) - Main entry point
//!
//! Serves the playback negotiation API: the viewer page registers camera
//! feeds, toggles playback and hosts the media element, while this service
//! decides which relay URL the element should load.

use std::path::PathBuf;

use anyhow::{Context, Result};
use camview_common::config::{CliOverrides, PlayerConfig};
use camview_common::events::EventBus;
use camview_player::api::{self, AppContext};
use camview_player::NegotiatorHandle;
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EVENT_BUS_CAPACITY: usize = 256;

/// Command-line arguments for camview-player
#[derive(Parser, Debug)]
#[command(name = "camview-player")]
#[command(about = "Relay playback negotiator for camera feeds")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Relay base address for low-latency (WebRTC) delivery
    #[arg(long)]
    primary_base: Option<String>,

    /// Relay base address for HLS delivery
    #[arg(long)]
    fallback_base: Option<String>,

    /// Seconds to wait before retrying after both delivery modes failed
    #[arg(long)]
    recovery_delay_secs: Option<u64>,

    /// Path to config.toml
    #[arg(short, long, env = "CAMVIEW_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = PlayerConfig::resolve(&CliOverrides {
        port: args.port,
        primary_base: args.primary_base,
        fallback_base: args.fallback_base,
        recovery_delay_secs: args.recovery_delay_secs,
        config_file: args.config,
    })
    .context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=debug", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting camview-player v{} on port {}",
        env!("CARGO_PKG_VERSION"),
        config.port
    );
    info!("Primary relay: {}", config.primary_base);
    info!("Fallback relay: {}", config.fallback_base);
    info!("Recovery delay: {:?}", config.recovery_delay);

    let event_bus = EventBus::new(EVENT_BUS_CAPACITY);
    let (negotiator, negotiator_task) = NegotiatorHandle::spawn(&config, event_bus.clone());
    info!("Negotiator initialized");

    let ctx = AppContext::new(negotiator, event_bus);
    api::run(config.port, ctx, shutdown_signal())
        .await
        .context("Server error")?;

    negotiator_task.abort();

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
