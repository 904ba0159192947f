//! Configuration schema types for Wicket.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with defaults.

mod browser;
mod server;
mod system;
mod tls;
mod window;

pub use browser::*;
pub use server::*;
pub use system::*;
pub use tls::*;
pub use window::*;

use serde::{Deserialize, Serialize};

/// Root configuration for Wicket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct WicketConfig {
    pub server: ServerConfig,
    pub browser: BrowserConfig,
    pub windows: WindowsConfig,
    pub tls: TlsConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Tests
// =============================================================================
