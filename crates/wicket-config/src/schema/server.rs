use serde::{Deserialize, Serialize};

/// Network settings for the channel transport and asset server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface the servers bind to. Ignored when `public` is set.
    pub host: String,
    /// Asset server port. `0` picks a free port on first show.
    pub port: u16,
    /// WebSocket channel port. `0` picks a free port.
    pub ws_port: u16,
    /// Accept connections from other machines.
    pub public: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            ws_port: 0,
            public: false,
        }
    }
}

impl ServerConfig {
    /// Address the servers should listen on.
    pub fn bind_host(&self) -> &str {
        if self.public {
            "0.0.0.0"
        } else {
            &self.host
        }
    }
}
