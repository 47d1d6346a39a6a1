use serde::{Deserialize, Serialize};

/// How a socket attaches to its endpoint.
///
/// `Auto` is direct PUB/SUB: publishers bind, subscribers connect. The
/// explicit modes support broker deployments where both sides connect to
/// the broker instead.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Attach {
    #[default]
    Auto,
    Bind,
    Connect,
}

/// Connection parameters for one bus endpoint.
///
/// Deserialized from the opaque `bus` table of a publisher or subscriber
/// context. The config layer hands that table over verbatim; only the
/// client inspects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// Endpoint string, "tcp://host:port" or "ipc:///path/to.sock".
    pub endpoint: String,

    /// Socket attachment mode override.
    #[serde(default)]
    pub attach: Attach,
}
