use std::path::PathBuf;

use crate::id::WindowId;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures of the transport carrying frames for one window.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("channel closed")]
    Closed,

    #[error("channel send failed: {0}")]
    Send(String),
}

/// Why a blocking script call did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    /// The browser ran the script and reported an error.
    #[error("script error: {0}")]
    Failed(String),

    #[error("script timed out")]
    Timeout,

    #[error("window disconnected")]
    Disconnected,

    #[error("invalid window: {0}")]
    InvalidWindow(WindowId),
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("invalid window: {0}")]
    InvalidWindow(WindowId),

    #[error("window already exists: {0}")]
    WindowExists(WindowId),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(&'static str),

    #[error("window {0} has no connected channel")]
    NotConnected(WindowId),

    #[error("channel token rejected for window {0}")]
    InvalidToken(WindowId),

    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("browser did not connect to window {0} before the startup timeout")]
    StartupTimeout(WindowId),

    #[error("port {0} is not available")]
    InvalidPort(u16),

    #[error("invalid TLS material: {0}")]
    InvalidCertificate(String),

    #[error("bridge has been shut down")]
    ShutDown,

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
