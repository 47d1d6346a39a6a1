use thiserror::Error;

use edgebus_client::BusError;
use edgebus_config::ConfigError;

/// Errors that can occur in the driver layer.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("template I/O error: {0}")]
    TemplateIo(#[from] std::io::Error),

    #[error("template parse error: {0}")]
    TemplateParse(#[from] serde_json::Error),

    #[error("message template root must be a JSON object")]
    TemplateNotObject,

    #[error("telemetry topic '{0}' has too few segments to derive a source topic")]
    MalformedTopic(String),

    #[error("all {0} publish tasks failed")]
    AllPublishersFailed(usize),
}
