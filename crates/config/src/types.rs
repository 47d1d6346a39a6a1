use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ── Top-level config ────────────────────────────────────────────────

/// Full configuration for the edgebus tools.
///
/// Parsed from `edgebus.toml` with support for environment variable
/// overrides. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tool-level settings shared by both binaries.
    pub app: AppSection,

    /// Named publisher contexts.
    #[serde(default)]
    pub publishers: Vec<PublisherContext>,

    /// Subscriber contexts, addressed by index.
    #[serde(default)]
    pub subscribers: Vec<SubscriberContext>,

    /// Configuration-change watch settings.
    #[serde(default)]
    pub watch: WatchSection,
}

// ── Section configs ─────────────────────────────────────────────────

/// `[app]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSection {
    /// Name of the publisher context the publish tool drives.
    #[serde(default)]
    pub publisher: String,

    /// Directory containing message template files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Message template filename inside `data_dir`.
    #[serde(default = "default_message_file")]
    pub message_file: String,

    /// Republish interval in seconds. Absent means publish once.
    pub interval_secs: Option<u64>,

    /// Delay in milliseconds before the first publish, giving subscribers
    /// time to attach.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("/var/lib/edgebus/datafiles")
}

fn default_message_file() -> String {
    "message.json".into()
}

fn default_settle_ms() -> u64 {
    500
}

impl AppSection {
    /// Full path to the message template file.
    pub fn message_path(&self) -> PathBuf {
        self.data_dir.join(&self.message_file)
    }

    /// Republish cadence, if configured.
    pub fn interval(&self) -> Option<Duration> {
        self.interval_secs.map(Duration::from_secs)
    }

    /// Pre-publish settle delay.
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// A named publisher context: its topics and opaque bus parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherContext {
    /// Context name, looked up via `[app] publisher`.
    pub name: String,

    /// Topics this context publishes on.
    #[serde(default)]
    pub topics: Vec<String>,

    /// Connection parameters handed verbatim to the bus client.
    pub bus: toml::Value,
}

impl PublisherContext {
    /// Topics this context publishes on.
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// The opaque bus table for the client constructor.
    pub fn bus_config(&self) -> toml::Value {
        self.bus.clone()
    }
}

/// A subscriber context, addressed by its position in the config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberContext {
    /// Optional label used in logs.
    #[serde(default)]
    pub name: Option<String>,

    /// Topics this context subscribes to.
    #[serde(default)]
    pub topics: Vec<String>,

    /// Connection parameters handed verbatim to the bus client.
    pub bus: toml::Value,
}

impl SubscriberContext {
    /// Topics this context subscribes to.
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// The opaque bus table for the client constructor.
    pub fn bus_config(&self) -> toml::Value {
        self.bus.clone()
    }

    /// Log label: the configured name, or a positional fallback.
    pub fn label(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("subscriber-{index}"))
    }
}

/// `[watch]` section: paths whose changes terminate the tools.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WatchSection {
    /// Single file to watch.
    pub path: Option<PathBuf>,

    /// Directory tree to watch recursively.
    pub prefix: Option<PathBuf>,
}
