//! Seam to the collaborator that starts browser processes.

use std::io;

use wicket_common::{BridgeError, WindowId};
use wicket_config::schema::BrowserKind;

use crate::bridge::{Profile, WindowSettings};

/// Everything a launcher needs to open one window.
#[derive(Debug)]
pub struct LaunchRequest<'a> {
    pub window: WindowId,
    pub url: &'a str,
    pub browser: BrowserKind,
    pub settings: &'a WindowSettings,
}

/// Outcome of a launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launched {
    /// A browser process was started. The bridge waits for it to connect.
    Process(u32),
    /// Nothing was started; the page is expected to connect on its own.
    Detached,
}

/// Starts browsers and owns their on-disk profiles.
pub trait Launcher: Send + Sync {
    fn launch(&self, request: &LaunchRequest<'_>) -> Result<Launched, BridgeError>;

    /// Remove a browser profile directory. Missing profiles are not an error.
    fn remove_profile(&self, profile: &Profile) -> io::Result<()> {
        match std::fs::remove_dir_all(&profile.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Launcher that never starts anything. Windows are shown by whoever opens
/// the URL, e.g. a browser the user points at the server, or a test.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBrowser;

impl Launcher for NoBrowser {
    fn launch(&self, request: &LaunchRequest<'_>) -> Result<Launched, BridgeError> {
        tracing::info!(window = %request.window, url = request.url, "open this URL to show the window");
        Ok(Launched::Detached)
    }
}
