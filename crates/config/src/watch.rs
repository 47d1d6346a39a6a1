//! Filesystem-backed configuration watch.

use std::path::Path;
use std::time::Duration;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::error::ConfigError;

/// Watches a configuration path and invokes a callback on change.
///
/// The callback receives the triggering path and the file's fresh contents
/// when it could be read back. The watcher must be kept alive for the watch
/// to stay registered; dropping it unregisters the watch.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
}

impl ConfigWatcher {
    /// Watch a single file.
    pub fn watch(
        path: &Path,
        callback: impl Fn(&Path, Option<&str>) + Send + 'static,
    ) -> Result<Self, ConfigError> {
        Self::register(path, RecursiveMode::NonRecursive, callback)
    }

    /// Watch a directory tree recursively.
    pub fn watch_prefix(
        path: &Path,
        callback: impl Fn(&Path, Option<&str>) + Send + 'static,
    ) -> Result<Self, ConfigError> {
        Self::register(path, RecursiveMode::Recursive, callback)
    }

    fn register(
        path: &Path,
        mode: RecursiveMode,
        callback: impl Fn(&Path, Option<&str>) + Send + 'static,
    ) -> Result<Self, ConfigError> {
        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    // Access events fire on plain reads and carry no change.
                    if !matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    ) {
                        return;
                    }
                    for changed in &event.paths {
                        let value = std::fs::read_to_string(changed).ok();
                        callback(changed, value.as_deref());
                    }
                }
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            },
        )?;

        watcher.watch(path, mode)?;

        let _ = watcher
            .configure(notify::Config::default().with_poll_interval(Duration::from_millis(500)));

        info!(path = %path.display(), "watching for configuration changes");
        Ok(Self { _watcher: watcher })
    }
}
