use std::sync::Arc;

use tracing::debug;
use wicket_common::{BridgeError, Result, WindowId};

use crate::sync::{read, write};

use super::window::Window;
use super::Bridge;

impl Bridge {
    /// Create a window with the lowest free id.
    pub fn new_window(&self) -> Result<WindowId> {
        self.ensure_running()?;
        let defaults = self.settings().window_defaults.clone();
        let mut windows = write(&self.shared.windows);
        let id = (1..self.shared.max_windows)
            .map(WindowId)
            .find(|id| !windows.contains_key(id))
            .ok_or(BridgeError::ResourceExhausted("window ids"))?;
        windows.insert(id, Arc::new(Window::new(id, defaults)));
        debug!(window = %id, "window created");
        Ok(id)
    }

    /// Create a window with a caller-chosen id.
    pub fn new_window_with_id(&self, id: WindowId) -> Result<WindowId> {
        self.ensure_running()?;
        if id.0 == 0 || id.0 >= self.shared.max_windows {
            return Err(BridgeError::InvalidWindow(id));
        }
        let defaults = self.settings().window_defaults.clone();
        let mut windows = write(&self.shared.windows);
        if windows.contains_key(&id) {
            return Err(BridgeError::WindowExists(id));
        }
        windows.insert(id, Arc::new(Window::new(id, defaults)));
        debug!(window = %id, "window created");
        Ok(id)
    }

    /// The id [`new_window`](Self::new_window) would pick, without reserving it.
    pub fn free_window_id(&self) -> Option<WindowId> {
        let windows = read(&self.shared.windows);
        (1..self.shared.max_windows)
            .map(WindowId)
            .find(|id| !windows.contains_key(id))
    }

    /// Close the window, release its bindings and pending calls, and free
    /// its id.
    pub fn destroy(&self, id: WindowId) -> Result<()> {
        self.ensure_running()?;
        let window = write(&self.shared.windows)
            .remove(&id)
            .ok_or(BridgeError::InvalidWindow(id))?;
        self.close_window(&window);
        window.release();
        debug!(window = %id, "window destroyed");
        Ok(())
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        let mut ids: Vec<_> = read(&self.shared.windows).keys().copied().collect();
        ids.sort();
        ids
    }

    pub(crate) fn window(&self, id: WindowId) -> Result<Arc<Window>> {
        read(&self.shared.windows)
            .get(&id)
            .cloned()
            .ok_or(BridgeError::InvalidWindow(id))
    }
}
