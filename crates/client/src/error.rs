use thiserror::Error;

/// Errors that can occur in the edgebus client layer.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("zeromq error: {0}")]
    Zmq(#[from] zeromq::ZmqError),

    #[error("message serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("malformed frame: {0}")]
    Frame(String),

    #[error("bus config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid endpoint '{0}'")]
    Endpoint(String),

    #[error("topic '{0}' already has an active subscriber on this client")]
    DuplicateSubscription(String),

    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}
