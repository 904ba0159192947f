//! Logging configuration.

use serde::{Deserialize, Serialize};

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Filter directive for the wicket crates at this level.
    pub fn directive(self) -> &'static str {
        match self {
            Self::Trace => "wicket=trace",
            Self::Debug => "wicket=debug",
            Self::Info => "wicket=info",
            Self::Warn => "wicket=warn",
            Self::Error => "wicket=error",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}
