//! Browser selection and start-up settings.

use serde::{Deserialize, Serialize};

/// Browser engine used to display a window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum BrowserKind {
    /// Do not start a browser; the page is opened by other means.
    None,
    /// The recommended browser available on this machine.
    #[default]
    Any,
    Chrome,
    Firefox,
    Edge,
    Safari,
    Chromium,
    Opera,
    Brave,
    Vivaldi,
    Epic,
    Yandex,
    ChromiumBased,
}

/// Browser start-up configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub default: BrowserKind,
    /// Seconds to wait for a started browser to connect (valid range: 1-600).
    pub startup_timeout: u32,
    /// Start windows in kiosk mode.
    pub kiosk: bool,
    /// Start windows hidden.
    pub hidden: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            default: BrowserKind::Any,
            startup_timeout: 30,
            kiosk: false,
            hidden: false,
        }
    }
}
