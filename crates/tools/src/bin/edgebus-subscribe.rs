//! edgebus-subscribe — receives and counts messages on configured topics.
//!
//! Reads the app config, then for every configured subscriber context opens
//! one bus client and one subscriber handle per topic. Each handle is driven
//! by its own receive loop logging messages with per-topic running counts.
//! A change on the watched configuration path, SIGINT, or SIGTERM
//! terminates the process.
//!
//! # Usage
//!
//! ```bash
//! edgebus-subscribe --config config/edgebus.toml
//!
//! # Via environment variables
//! EDGEBUS_CONFIG=/etc/edgebus/edgebus.toml RUST_LOG=debug edgebus-subscribe
//! ```

use clap::Parser;
use tracing::info;

use edgebus_config::AppConfig;
use edgebus_tools::{shutdown, subscriber};

/// Config-driven subscriber for the edgebus message bus.
#[derive(Parser, Debug)]
#[command(name = "edgebus-subscribe", version, about)]
struct Cli {
    /// Path to the edgebus config file.
    #[arg(long, env = "EDGEBUS_CONFIG", default_value = "config/edgebus.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = AppConfig::from_file(&cli.config)?;
    info!(path = %cli.config, "loaded edgebus config");

    let (shutdown, signal) = shutdown::channel();
    shutdown::listen_for_signals(shutdown.clone());

    subscriber::run(&config, shutdown, signal).await?;

    info!("edgebus-subscribe exited cleanly");
    Ok(())
}
