//! The bridge handle: every boundary operation of the engine.
//!
//! `Bridge` is a cheap, cloneable handle over shared state. One is built at
//! start-up from a [`WicketConfig`], handed to transports and callbacks, and
//! torn down with [`Bridge::cleanup`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tracing::{debug, info, warn};
use wicket_common::{BridgeError, Result};
use wicket_config::schema::BrowserKind;
use wicket_config::WicketConfig;

use crate::binding::BindIdAllocator;
use crate::buffers::Buffers;
use crate::content::FileHandler;
use crate::launcher::Launcher;
use crate::lifecycle::LifecycleGate;
use crate::sync::lock;

mod interface;
mod lifecycle;
mod registry;
mod script;
mod window;

pub use window::{DisplayState, Icon, Profile, WindowSettings};
pub(crate) use window::Window;

/// PEM certificate and key used when windows are served over HTTPS.
#[derive(Clone, PartialEq, Eq)]
pub struct TlsMaterial {
    pub certificate_pem: String,
    pub private_key_pem: String,
}

impl std::fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("certificate_pem", &format!("{} bytes", self.certificate_pem.len()))
            .field("private_key_pem", &"<redacted>")
            .finish()
    }
}

/// Process-wide settings. Read at `show` time.
pub(crate) struct GlobalSettings {
    pub default_root_folder: Option<PathBuf>,
    pub startup_timeout: Duration,
    pub tls: Option<TlsMaterial>,
    pub file_handler: Option<Arc<FileHandler>>,
    pub channel_endpoint: Option<String>,
    pub host: String,
    pub server_port: Option<u16>,
    pub default_browser: BrowserKind,
    pub window_defaults: WindowSettings,
}

pub(crate) struct Shared {
    pub windows: RwLock<HashMap<wicket_common::WindowId, Arc<Window>>>,
    pub max_windows: usize,
    pub bind_ids: BindIdAllocator,
    pub gate: LifecycleGate,
    pub settings: Mutex<GlobalSettings>,
    pub launcher: Arc<dyn Launcher>,
    pub buffers: Buffers,
    pub shut_down: AtomicBool,
}

#[derive(Clone)]
pub struct Bridge {
    pub(crate) shared: Arc<Shared>,
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("windows", &self.window_ids())
            .field("shown", &self.shared.gate.shown())
            .field("shut_down", &self.shared.shut_down.load(Ordering::SeqCst))
            .finish()
    }
}

impl Bridge {
    /// Build a bridge from configuration. TLS material named in the config
    /// is not read here; see [`Bridge::from_config`].
    pub fn new(config: &WicketConfig, launcher: Arc<dyn Launcher>) -> Self {
        let root = &config.windows.default_root_folder;
        let host = config.server.host.clone();
        let settings = GlobalSettings {
            default_root_folder: (!root.is_empty()).then(|| PathBuf::from(root)),
            startup_timeout: Duration::from_secs(u64::from(config.browser.startup_timeout)),
            tls: None,
            file_handler: None,
            channel_endpoint: (config.server.ws_port != 0)
                .then(|| format!("ws://{host}:{}/", config.server.ws_port)),
            server_port: (config.server.port != 0).then_some(config.server.port),
            host,
            default_browser: config.browser.default,
            window_defaults: WindowSettings {
                kiosk: config.browser.kiosk,
                hidden: config.browser.hidden,
                width: config.windows.width,
                height: config.windows.height,
                public: config.server.public,
                ..Default::default()
            },
        };

        Self {
            shared: Arc::new(Shared {
                windows: RwLock::new(HashMap::new()),
                max_windows: config.windows.max_windows as usize,
                bind_ids: BindIdAllocator::new(),
                gate: LifecycleGate::default(),
                settings: Mutex::new(settings),
                launcher,
                buffers: Buffers::default(),
                shut_down: AtomicBool::new(false),
            }),
        }
    }

    /// Like [`Bridge::new`], also loading the TLS certificate and key files
    /// named in the config.
    pub fn from_config(config: &WicketConfig, launcher: Arc<dyn Launcher>) -> Result<Self> {
        let bridge = Self::new(config, launcher);
        if config.tls.is_configured() {
            let cert = std::fs::read_to_string(&config.tls.certificate_path)?;
            let key = std::fs::read_to_string(&config.tls.private_key_path)?;
            bridge.set_tls_certificate(&cert, &key)?;
        }
        Ok(bridge)
    }

    pub(crate) fn ensure_running(&self) -> Result<()> {
        if self.shared.shut_down.load(Ordering::SeqCst) {
            return Err(BridgeError::ShutDown);
        }
        Ok(())
    }

    pub(crate) fn settings(&self) -> std::sync::MutexGuard<'_, GlobalSettings> {
        lock(&self.shared.settings)
    }

    // =========================================================================
    // Lifecycle gate
    // =========================================================================

    /// Block until every shown window has closed or [`exit`](Self::exit) is
    /// called. Returns immediately if no window is shown.
    pub fn wait(&self) {
        self.shared.gate.wait();
    }

    /// Block until a window is shown or [`exit`](Self::exit) is called.
    pub fn wait_shown(&self) {
        self.shared.gate.wait_shown();
    }

    /// [`wait`](Self::wait) with a deadline. Returns `true` if the wait
    /// ended before the deadline.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.shared.gate.wait_timeout(timeout)
    }

    /// Request exit, close every window and wake all waiters.
    pub fn exit(&self) {
        info!("exit requested");
        self.shared.gate.request_exit();
        for id in self.window_ids() {
            if let Ok(window) = self.window(id) {
                self.close_window(&window);
            }
        }
    }

    /// Destroy every window and release managed buffers. Every later call
    /// fails with [`BridgeError::ShutDown`].
    pub fn cleanup(&self) {
        if self.shared.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared.gate.request_exit();
        let windows: Vec<_> = crate::sync::write(&self.shared.windows)
            .drain()
            .map(|(_, window)| window)
            .collect();
        for window in &windows {
            self.close_window(window);
            window.release();
        }
        let buffers = self.shared.buffers.clear();
        info!(windows = windows.len(), buffers, "bridge cleaned up");
    }

    pub fn is_app_running(&self) -> bool {
        !self.shared.shut_down.load(Ordering::SeqCst)
            && !self.shared.gate.exit_requested()
            && self.shared.gate.shown() > 0
    }

    // =========================================================================
    // Global settings
    // =========================================================================

    /// Root folder for windows that do not set their own.
    pub fn set_default_root_folder(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.ensure_running()?;
        let path = path.into();
        if !path.is_dir() {
            return Err(BridgeError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("not a directory: {}", path.display()),
            )));
        }
        self.settings().default_root_folder = Some(path);
        Ok(())
    }

    /// How long `show` waits for a started browser to connect.
    pub fn set_timeout(&self, timeout: Duration) {
        self.settings().startup_timeout = timeout;
    }

    /// Install PEM certificate and key for HTTPS windows. Passing two empty
    /// strings clears them.
    pub fn set_tls_certificate(&self, certificate_pem: &str, private_key_pem: &str) -> Result<()> {
        self.ensure_running()?;
        if certificate_pem.is_empty() && private_key_pem.is_empty() {
            self.settings().tls = None;
            return Ok(());
        }
        for (what, pem) in [("certificate", certificate_pem), ("private key", private_key_pem)] {
            if !is_pem(pem) {
                return Err(BridgeError::InvalidCertificate(format!(
                    "{what} is not a PEM block"
                )));
            }
        }
        self.settings().tls = Some(TlsMaterial {
            certificate_pem: certificate_pem.to_string(),
            private_key_pem: private_key_pem.to_string(),
        });
        debug!("TLS material installed");
        Ok(())
    }

    pub fn tls_material(&self) -> Option<TlsMaterial> {
        self.settings().tls.clone()
    }

    /// Serve files through `handler` before falling back to the root folder.
    pub fn set_file_handler<F>(&self, handler: F)
    where
        F: Fn(&str) -> Option<Vec<u8>> + Send + Sync + 'static,
    {
        self.settings().file_handler = Some(Arc::new(handler));
    }

    /// WebSocket endpoint advertised to browsers in `wicket.js`.
    pub fn set_channel_endpoint(&self, endpoint: impl Into<String>) {
        self.settings().channel_endpoint = Some(endpoint.into());
    }

    pub fn channel_endpoint(&self) -> Option<String> {
        self.settings().channel_endpoint.clone()
    }

    /// Port of the server that serves window assets. Windows without their
    /// own port use it in their URL.
    pub fn set_server_port(&self, port: u16) {
        self.settings().server_port = (port != 0).then_some(port);
    }

    /// Remove the browser profile of every window.
    pub fn delete_all_profiles(&self) -> Result<()> {
        self.ensure_running()?;
        let mut seen = Vec::new();
        for id in self.window_ids() {
            let Ok(window) = self.window(id) else {
                continue;
            };
            for profile in window.profiles() {
                if !seen.contains(&profile) {
                    seen.push(profile);
                }
            }
        }
        for profile in &seen {
            if let Err(e) = self.shared.launcher.remove_profile(profile) {
                warn!(profile = %profile.name, error = %e, "failed to delete profile");
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Managed buffers, freed in bulk by [`cleanup`](Self::cleanup).
    pub fn buffers(&self) -> &Buffers {
        &self.shared.buffers
    }
}

fn is_pem(text: &str) -> bool {
    text.contains("-----BEGIN ") && text.contains("-----END ")
}

#[cfg(test)]
mod tests;
