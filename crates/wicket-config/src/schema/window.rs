//! Window defaults and limits.

use serde::{Deserialize, Serialize};

/// Window defaults applied to every newly created window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowsConfig {
    /// Upper bound on window ids; ids range over `1..max_windows`
    /// (valid range: 2-4096).
    pub max_windows: u32,
    /// Initial width in pixels, `0` leaves it to the browser.
    pub width: u32,
    /// Initial height in pixels, `0` leaves it to the browser.
    pub height: u32,
    /// Folder served to windows without their own root folder.
    /// Empty means the current working directory.
    pub default_root_folder: String,
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            max_windows: 256,
            width: 0,
            height: 0,
            default_root_folder: String::new(),
        }
    }
}
