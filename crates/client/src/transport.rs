use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BusError;

/// Transport layer for ZeroMQ connections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "address")]
pub enum Transport {
    /// Inter-process communication via a Unix domain socket at the given path.
    Ipc(String),

    /// TCP transport for cross-host deployment.
    Tcp { host: String, port: u16 },
}

impl Transport {
    /// Create an IPC transport from a filesystem path.
    pub fn ipc(path: impl Into<String>) -> Self {
        Self::Ipc(path.into())
    }

    /// Create a TCP transport with the given host and port.
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Parse an endpoint string like "tcp://host:port" or "ipc:///run/edgebus/bus.sock".
    ///
    /// Unknown schemes, empty hosts/paths, and unparseable ports are rejected.
    pub fn parse(endpoint: &str) -> Result<Self, BusError> {
        if let Some(path) = endpoint.strip_prefix("ipc://") {
            if path.is_empty() {
                return Err(BusError::Endpoint(endpoint.to_string()));
            }
            Ok(Self::Ipc(path.to_string()))
        } else if let Some(addr) = endpoint.strip_prefix("tcp://") {
            let (host, port_str) = addr
                .rsplit_once(':')
                .ok_or_else(|| BusError::Endpoint(endpoint.to_string()))?;
            if host.is_empty() {
                return Err(BusError::Endpoint(endpoint.to_string()));
            }
            let port = port_str
                .parse()
                .map_err(|_| BusError::Endpoint(endpoint.to_string()))?;
            Ok(Self::Tcp {
                host: host.to_string(),
                port,
            })
        } else {
            Err(BusError::Endpoint(endpoint.to_string()))
        }
    }

    /// Generate the ZeroMQ endpoint address string.
    pub fn endpoint(&self) -> String {
        match self {
            Self::Ipc(path) => format!("ipc://{path}"),
            Self::Tcp { host, port } => format!("tcp://{host}:{port}"),
        }
    }

    /// For IPC transports, ensure the parent directory exists.
    ///
    /// ZeroMQ requires the directory to exist before binding an IPC socket.
    /// This is a no-op for TCP transports.
    pub fn ensure_ipc_dir(&self) -> std::io::Result<()> {
        if let Self::Ipc(path) = self {
            if let Some(parent) = Path::new(path).parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Remove a stale IPC socket file left over from a previous run.
    ///
    /// ZeroMQ IPC sockets are regular files. If the process exits without
    /// cleanup, the `.sock` file persists and causes `EADDRINUSE` on next
    /// bind. This is a no-op for TCP transports or if the file doesn't exist.
    pub fn remove_stale_socket(&self) -> std::io::Result<()> {
        if let Self::Ipc(path) = self {
            match std::fs::remove_file(path) {
                Ok(()) => {
                    tracing::debug!(path = %path, "removed stale IPC socket");
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.endpoint())
    }
}
