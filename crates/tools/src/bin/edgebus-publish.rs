//! edgebus-publish — republishes a JSON message template on configured topics.
//!
//! Reads the app config, resolves the configured publisher context, then
//! fans out one publish task per topic. With an interval configured each
//! topic republishes on that cadence; otherwise each topic publishes once
//! and stays up. A change on the watched configuration path, SIGINT, or
//! SIGTERM terminates the process.
//!
//! # Usage
//!
//! ```bash
//! edgebus-publish --config config/edgebus.toml
//!
//! # Via environment variables
//! EDGEBUS_CONFIG=/etc/edgebus/edgebus.toml RUST_LOG=debug edgebus-publish
//! ```

use clap::Parser;
use tracing::info;

use edgebus_config::AppConfig;
use edgebus_tools::{publisher, shutdown};

/// Config-driven publisher for the edgebus message bus.
#[derive(Parser, Debug)]
#[command(name = "edgebus-publish", version, about)]
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

    publisher::run(&config, shutdown, signal).await?;

    info!("edgebus-publish exited cleanly");
    Ok(())
}
