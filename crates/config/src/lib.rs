pub mod context;
pub mod error;
pub mod loading;
pub mod types;
pub mod validation;
pub mod watch;

pub use error::ConfigError;
pub use types::{AppConfig, AppSection, PublisherContext, SubscriberContext, WatchSection};
pub use watch::ConfigWatcher;
