use thiserror::Error;

/// Errors that can occur in the edgebus configuration layer.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("no publisher context named '{0}'")]
    UnknownPublisher(String),

    #[error("no subscriber context at index {0}")]
    SubscriberIndex(usize),

    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}
