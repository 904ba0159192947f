use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};
use wicket_common::{new_channel_token, BridgeError, Result, WindowId};
use wicket_config::schema::BrowserKind;

use crate::channel::{self, Inbound, Transport};
use crate::content::{Asset, AssetResolver, ShowContent};
use crate::launcher::{LaunchRequest, Launched};
use crate::protocol::{OutboundFrame, CLIENT_SCRIPT};

use super::window::{DisplayState, Icon, Profile, Window, WindowSettings};
use super::Bridge;

impl Bridge {
    // =========================================================================
    // Show / close
    // =========================================================================

    /// Show `content` in the window: inline HTML, a URL, or a file path.
    ///
    /// A window with a live channel is navigated in place. Otherwise the
    /// launcher starts a browser; if it started a process, this blocks until
    /// the browser connects or the startup timeout passes.
    pub fn show(&self, id: WindowId, content: &str) -> Result<()> {
        self.show_inner(id, content, None)
    }

    /// [`show`](Self::show) with an explicit browser.
    pub fn show_with(&self, id: WindowId, content: &str, browser: BrowserKind) -> Result<()> {
        self.show_inner(id, content, Some(browser))
    }

    fn show_inner(&self, id: WindowId, content: &str, browser: Option<BrowserKind>) -> Result<()> {
        self.ensure_running()?;
        let window = self.window(id)?;
        let content = ShowContent::classify(content);

        let (host, scheme, server_port, handler, default_root, default_browser, startup_timeout) = {
            let settings = self.settings();
            (
                settings.host.clone(),
                if settings.tls.is_some() { "https" } else { "http" },
                settings.server_port,
                settings.file_handler.clone(),
                settings.default_root_folder.clone(),
                settings.default_browser,
                settings.startup_timeout,
            )
        };

        let (url, live, active) = {
            let mut state = window.state();
            let mut active = state.settings.clone();
            if active.root_folder.is_none() {
                active.root_folder = default_root;
            }

            let (root, index, page) = match &content {
                ShowContent::Html(html) => (active.root_folder.clone(), Some(html.clone()), String::new()),
                ShowContent::Url(_) => (active.root_folder.clone(), None, String::new()),
                ShowContent::File(path) => file_page(path, active.root_folder.as_deref()),
            };

            let url = match &content {
                ShowContent::Url(url) => url.clone(),
                _ => {
                    let port = match active.port.or(server_port) {
                        Some(port) => port,
                        None => free_port()?,
                    };
                    format!("{scheme}://{host}:{port}/{id}/{page}")
                }
            };

            state.assets = AssetResolver {
                root,
                index,
                handler,
            };
            state.content = Some(content);
            state.url = Some(url.clone());
            state.token = Some(new_channel_token());
            state.active = Some(active.clone());
            let live = state.channel.is_some() && state.display == DisplayState::Shown;
            (url, live, active)
        };

        if live {
            debug!(window = %id, url = %url, "refreshing live window");
            return window.send(&OutboundFrame::Navigate { url });
        }

        let browser = browser.or(active.browser).unwrap_or(default_browser);
        let request = LaunchRequest {
            window: id,
            url: &url,
            browser,
            settings: &active,
        };
        match self.shared.launcher.launch(&request)? {
            Launched::Process(pid) => {
                window.state().child_pid = Some(pid);
                info!(window = %id, pid, url = %url, "browser started");
                if !window.wait_connected(startup_timeout) {
                    warn!(window = %id, "browser did not connect in time");
                    return Err(BridgeError::StartupTimeout(id));
                }
                Ok(())
            }
            Launched::Detached => {
                debug!(window = %id, url = %url, "window shown without a browser process");
                Ok(())
            }
        }
    }

    pub fn is_shown(&self, id: WindowId) -> bool {
        self.window(id)
            .map(|w| w.state().display == DisplayState::Shown)
            .unwrap_or(false)
    }

    pub fn display_state(&self, id: WindowId) -> Result<DisplayState> {
        Ok(self.window(id)?.state().display)
    }

    /// Tear down the window's channel. The window itself stays registered
    /// and can be shown again.
    pub fn close(&self, id: WindowId) -> Result<()> {
        self.ensure_running()?;
        let window = self.window(id)?;
        self.close_window(&window);
        Ok(())
    }

    pub(crate) fn close_window(&self, window: &Window) {
        let Some(channel) = window.detach(&self.shared.gate) else {
            return;
        };
        let _ = channel.transport.send(&OutboundFrame::Close);
        channel.transport.close();
        let failed = window.pending.fail_generation(channel.generation);
        debug!(window = %window.id, failed, "window closed");
    }

    pub fn navigate(&self, id: WindowId, url: &str) -> Result<()> {
        self.ensure_running()?;
        let window = self.window(id)?;
        window.send(&OutboundFrame::Navigate {
            url: url.to_string(),
        })?;
        window.state().url = Some(url.to_string());
        Ok(())
    }

    /// URL the window was last shown or navigated at.
    pub fn url(&self, id: WindowId) -> Result<Option<String>> {
        Ok(self.window(id)?.state().url.clone())
    }

    pub fn parent_process_id(&self) -> u32 {
        std::process::id()
    }

    /// Process id of the browser started for the window, if any.
    pub fn child_process_id(&self, id: WindowId) -> Result<Option<u32>> {
        Ok(self.window(id)?.state().child_pid)
    }

    /// Channel token handed out by the last `show`.
    pub fn channel_token(&self, id: WindowId) -> Result<Option<String>> {
        Ok(self.window(id)?.state().token.clone())
    }

    // =========================================================================
    // Channels
    // =========================================================================

    /// Attach a transport as the window's channel. The token must match the
    /// one from the last `show`. A previous channel is closed and its
    /// pending calls fail.
    pub fn attach_channel(
        &self,
        id: WindowId,
        token: &str,
        transport: Arc<dyn Transport>,
    ) -> Result<Inbound> {
        self.ensure_running()?;
        let window = self.window(id)?;
        let (attached, old) = window.attach(token, transport)?;
        if let Some(old) = old {
            old.transport.close();
            let failed = window.pending.fail_generation(old.generation);
            debug!(window = %id, failed, "replaced previous channel");
        }
        debug!(window = %id, generation = attached.generation, "channel attached");
        Ok(channel::spawn(self.clone(), window, attached)?)
    }

    // =========================================================================
    // Window settings
    // =========================================================================

    fn update_settings(&self, id: WindowId, f: impl FnOnce(&mut WindowSettings)) -> Result<()> {
        self.ensure_running()?;
        let window = self.window(id)?;
        f(&mut window.state().settings);
        Ok(())
    }

    /// Settings in effect: the last show's snapshot, or the pending ones if
    /// the window was never shown.
    pub fn window_settings(&self, id: WindowId) -> Result<WindowSettings> {
        let window = self.window(id)?;
        let state = window.state();
        Ok(state.active.clone().unwrap_or_else(|| state.settings.clone()))
    }

    /// Whether the window accepts browsers on other hosts. Unknown windows
    /// are private.
    pub fn is_public(&self, id: WindowId) -> bool {
        self.window_settings(id).is_ok_and(|s| s.public)
    }

    pub fn set_kiosk(&self, id: WindowId, kiosk: bool) -> Result<()> {
        self.update_settings(id, |s| s.kiosk = kiosk)
    }

    pub fn set_hidden(&self, id: WindowId, hidden: bool) -> Result<()> {
        self.update_settings(id, |s| s.hidden = hidden)
    }

    pub fn set_size(&self, id: WindowId, width: u32, height: u32) -> Result<()> {
        self.update_settings(id, |s| {
            s.width = width;
            s.height = height;
        })
    }

    pub fn set_position(&self, id: WindowId, x: i32, y: i32) -> Result<()> {
        self.update_settings(id, |s| s.position = Some((x, y)))
    }

    /// Use a named browser profile. Empty name and path select the
    /// browser's default profile.
    pub fn set_profile(&self, id: WindowId, name: &str, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let profile = (!name.is_empty() || !path.as_os_str().is_empty()).then(|| Profile {
            name: name.to_string(),
            path,
        });
        self.update_settings(id, |s| s.profile = profile)
    }

    pub fn set_root_folder(&self, id: WindowId, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        if !path.is_dir() {
            return Err(BridgeError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("not a directory: {}", path.display()),
            )));
        }
        self.update_settings(id, |s| s.root_folder = Some(path))
    }

    pub fn set_public(&self, id: WindowId, public: bool) -> Result<()> {
        self.update_settings(id, |s| s.public = public)
    }

    /// Serve the window on a fixed port. `0` restores automatic selection.
    /// Fails if another process already holds the port.
    pub fn set_port(&self, id: WindowId, port: u16) -> Result<()> {
        if port != 0 && TcpListener::bind(("127.0.0.1", port)).is_err() {
            return Err(BridgeError::InvalidPort(port));
        }
        self.update_settings(id, |s| s.port = (port != 0).then_some(port))
    }

    pub fn set_icon(&self, id: WindowId, data: impl Into<Vec<u8>>, mime: &str) -> Result<()> {
        let icon = Icon {
            data: data.into(),
            mime: mime.to_string(),
        };
        self.update_settings(id, |s| s.icon = Some(icon))
    }

    pub fn set_browser(&self, id: WindowId, browser: BrowserKind) -> Result<()> {
        self.update_settings(id, |s| s.browser = Some(browser))
    }

    /// Remove the window's browser profile from disk.
    pub fn delete_profile(&self, id: WindowId) -> Result<()> {
        self.ensure_running()?;
        for profile in self.window(id)?.profiles() {
            self.shared.launcher.remove_profile(&profile)?;
        }
        Ok(())
    }

    // =========================================================================
    // Assets
    // =========================================================================

    /// Resolve an asset request for the window. `wicket.js` is the client
    /// script configured for the window's current token.
    pub fn resolve_asset(&self, id: WindowId, path: &str) -> Option<Asset> {
        let window = self.window(id).ok()?;
        let clean = path.trim_start_matches('/');

        if clean == "wicket.js" {
            let endpoint = self.channel_endpoint();
            let token = window.state().token.clone()?;
            let config = serde_json::json!({
                "endpoint": endpoint,
                "window": id,
                "token": token,
            });
            let script = format!("window.__wicket_config = {config};\n{CLIENT_SCRIPT}");
            return Some(Asset {
                mime: "application/javascript",
                data: script.into_bytes(),
            });
        }

        let state = window.state();
        if clean.starts_with("favicon") {
            if let Some(icon) = state.active.as_ref().and_then(|s| s.icon.as_ref()) {
                return Some(Asset {
                    mime: icon_mime(&icon.mime),
                    data: icon.data.clone(),
                });
            }
        }
        let assets = state.assets.clone();
        drop(state);
        assets.resolve(path)
    }
}

/// Root and page for a file shown by path. Relative paths resolve under the
/// root folder (or the working directory); absolute paths serve from their
/// parent directory.
fn file_page(path: &Path, root: Option<&Path>) -> (Option<PathBuf>, Option<String>, String) {
    if path.is_absolute() {
        let parent = path.parent().map(Path::to_path_buf);
        let page = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        return (parent, None, page);
    }
    let root = root.map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let page = path.to_string_lossy().replace('\\', "/");
    (Some(root), None, page)
}

fn free_port() -> Result<u16> {
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    Ok(listener.local_addr()?.port())
}

fn icon_mime(mime: &str) -> &'static str {
    match mime {
        "image/svg+xml" => "image/svg+xml",
        "image/png" => "image/png",
        "image/jpeg" => "image/jpeg",
        "image/gif" => "image/gif",
        _ => "image/x-icon",
    }
}
