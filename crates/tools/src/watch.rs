//! Configuration-change watch registration shared by both tools.

use tracing::info;

use edgebus_config::{AppConfig, ConfigWatcher};

use crate::error::ToolError;
use crate::shutdown::Shutdown;

/// Register the configured watches.
///
/// A change to any watched path logs the triggering key and value and
/// trips the shutdown token. The returned watchers must be kept alive
/// for the watches to stay registered.
pub fn register(config: &AppConfig, shutdown: Shutdown) -> Result<Vec<ConfigWatcher>, ToolError> {
    let mut watchers = Vec::new();

    if let Some(path) = &config.watch.path {
        let shutdown = shutdown.clone();
        watchers.push(ConfigWatcher::watch(path, move |key, value| {
            info!(
                key = %key.display(),
                value = value.unwrap_or("<unreadable>"),
                "watched configuration changed, shutting down"
            );
            shutdown.trigger();
        })?);
    }

    if let Some(prefix) = &config.watch.prefix {
        let shutdown = shutdown.clone();
        watchers.push(ConfigWatcher::watch_prefix(prefix, move |key, value| {
            info!(
                key = %key.display(),
                value = value.unwrap_or("<unreadable>"),
                "watched configuration changed, shutting down"
            );
            shutdown.trigger();
        })?);
    }

    if watchers.is_empty() {
        info!("no configuration watch configured");
    }
    Ok(watchers)
}
