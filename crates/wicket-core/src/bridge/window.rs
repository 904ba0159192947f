use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use wicket_common::{BridgeError, WindowId};
use wicket_config::schema::BrowserKind;

use crate::binding::{Binding, BindingTable};
use crate::channel::{Channel, Transport};
use crate::codec::Arguments;
use crate::content::{AssetResolver, ShowContent};
use crate::lifecycle::LifecycleGate;
use crate::pending::{PendingCall, PendingCalls};
use crate::protocol::OutboundFrame;
use crate::sync::lock;

/// Display state of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayState {
    #[default]
    NotShown,
    Shown,
    Closed,
}

/// A named browser profile directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub path: PathBuf,
}

/// Window icon served as `favicon`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub data: Vec<u8>,
    pub mime: String,
}

/// Per-window configuration. Edits apply on the next `show`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowSettings {
    pub kiosk: bool,
    pub hidden: bool,
    pub width: u32,
    pub height: u32,
    pub position: Option<(i32, i32)>,
    pub profile: Option<Profile>,
    pub root_folder: Option<PathBuf>,
    pub public: bool,
    pub port: Option<u16>,
    pub icon: Option<Icon>,
    pub browser: Option<BrowserKind>,
}

#[derive(Default)]
pub(crate) struct WindowState {
    pub display: DisplayState,
    pub settings: WindowSettings,
    /// Snapshot taken by the last `show`.
    pub active: Option<WindowSettings>,
    pub content: Option<ShowContent>,
    pub assets: AssetResolver,
    pub url: Option<String>,
    pub token: Option<String>,
    pub channel: Option<Channel>,
    pub generation: u64,
    pub child_pid: Option<u32>,
}

#[derive(Default)]
struct Outstanding {
    args: Arguments,
    response: Option<String>,
}

pub(crate) struct Window {
    pub id: WindowId,
    state: Mutex<WindowState>,
    connected: Condvar,
    bindings: Mutex<BindingTable>,
    pub pending: PendingCalls,
    outstanding: Mutex<HashMap<usize, Outstanding>>,
}

impl Window {
    pub fn new(id: WindowId, settings: WindowSettings) -> Self {
        Self {
            id,
            state: Mutex::new(WindowState {
                settings,
                ..Default::default()
            }),
            connected: Condvar::new(),
            bindings: Mutex::new(BindingTable::default()),
            pending: PendingCalls::default(),
            outstanding: Mutex::new(HashMap::new()),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, WindowState> {
        lock(&self.state)
    }

    // -----------------------------------------------------------------
    // Channel
    // -----------------------------------------------------------------

    pub fn is_current(&self, generation: u64) -> bool {
        self.state()
            .channel
            .as_ref()
            .is_some_and(|c| c.generation == generation)
    }

    /// Whether a newer channel has been attached since `generation`.
    pub fn is_superseded(&self, generation: u64) -> bool {
        self.state().generation != generation
    }

    /// Install a new channel if `token` matches the last show. Returns the
    /// new channel and the one it replaced.
    pub fn attach(
        &self,
        token: &str,
        transport: Arc<dyn Transport>,
    ) -> Result<(Channel, Option<Channel>), BridgeError> {
        let mut state = self.state();
        if state.token.as_deref() != Some(token) {
            return Err(BridgeError::InvalidToken(self.id));
        }
        state.generation += 1;
        let channel = Channel {
            generation: state.generation,
            transport,
        };
        let old = state.channel.replace(channel.clone());
        Ok((channel, old))
    }

    /// Remove the current channel and revoke the token.
    pub fn detach(&self, gate: &LifecycleGate) -> Option<Channel> {
        let mut state = self.state();
        let channel = state.channel.take();
        state.token = None;
        if state.display == DisplayState::Shown {
            state.display = DisplayState::Closed;
            gate.window_closed();
        }
        channel
    }

    /// Returns `true` if the window became shown.
    pub fn mark_connected(&self, generation: u64, gate: &LifecycleGate) -> bool {
        let mut state = self.state();
        let current = state
            .channel
            .as_ref()
            .is_some_and(|c| c.generation == generation);
        if !current || state.display == DisplayState::Shown {
            return false;
        }
        state.display = DisplayState::Shown;
        gate.window_opened();
        self.connected.notify_all();
        true
    }

    /// Drop the channel `generation` if it is still current. Returns `false`
    /// for a channel that was already replaced or closed.
    pub fn mark_disconnected(&self, generation: u64, gate: &LifecycleGate) -> bool {
        let mut state = self.state();
        let current = state
            .channel
            .as_ref()
            .is_some_and(|c| c.generation == generation);
        if !current {
            return false;
        }
        state.channel = None;
        if state.display == DisplayState::Shown {
            gate.window_closed();
        }
        state.display = DisplayState::Closed;
        true
    }

    /// Block until the window is shown. Returns `false` on timeout.
    pub fn wait_connected(&self, timeout: Duration) -> bool {
        let state = self.state();
        let (state, _) = self
            .connected
            .wait_timeout_while(state, timeout, |s| s.display != DisplayState::Shown)
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state.display == DisplayState::Shown
    }

    pub fn send(&self, frame: &OutboundFrame) -> Result<(), BridgeError> {
        let transport = self
            .state()
            .channel
            .as_ref()
            .map(|c| Arc::clone(&c.transport))
            .ok_or(BridgeError::NotConnected(self.id))?;
        transport.send(frame)?;
        Ok(())
    }

    /// Register a script call against the current channel and send it. The
    /// call is tagged with the channel generation under the state lock, so
    /// a disconnect or replacement always sees it.
    pub fn send_script(&self, script: &str) -> Result<PendingCall, BridgeError> {
        let (call, transport) = {
            let state = self.state();
            let channel = state
                .channel
                .as_ref()
                .ok_or(BridgeError::NotConnected(self.id))?;
            (
                self.pending.register(channel.generation),
                Arc::clone(&channel.transport),
            )
        };
        let frame = OutboundFrame::Script {
            call_number: call.call_number,
            script: script.to_string(),
        };
        if let Err(e) = transport.send(&frame) {
            self.pending.cancel(call.call_number);
            return Err(e.into());
        }
        Ok(call)
    }

    pub fn profiles(&self) -> Vec<Profile> {
        let state = self.state();
        let active = state.active.as_ref().and_then(|s| s.profile.clone());
        state.settings.profile.iter().cloned().chain(active).collect()
    }

    // -----------------------------------------------------------------
    // Bindings
    // -----------------------------------------------------------------

    pub fn bind(&self, element: &str, binding: Binding) -> Option<Binding> {
        lock(&self.bindings).insert(element, binding)
    }

    pub fn unbind(&self, element: &str) -> Option<Binding> {
        lock(&self.bindings).remove(element)
    }

    pub fn resolve_binding(&self, element: &str) -> Option<Binding> {
        lock(&self.bindings).resolve(element)
    }

    pub fn wildcard(&self) -> Option<Binding> {
        lock(&self.bindings).wildcard()
    }

    pub fn binding_count(&self) -> usize {
        lock(&self.bindings).len()
    }

    // -----------------------------------------------------------------
    // Outstanding events
    // -----------------------------------------------------------------

    /// Returns `false` if `event_number` is already outstanding.
    pub fn begin_event(&self, event_number: usize, args: Arguments) -> bool {
        let mut outstanding = lock(&self.outstanding);
        if outstanding.contains_key(&event_number) {
            return false;
        }
        outstanding.insert(
            event_number,
            Outstanding {
                args,
                response: None,
            },
        );
        true
    }

    /// Retire an event, returning any response set through the raw interface.
    pub fn end_event(&self, event_number: usize) -> Option<String> {
        lock(&self.outstanding)
            .remove(&event_number)
            .and_then(|o| o.response)
    }

    pub fn event_args(&self, event_number: usize) -> Option<Arguments> {
        lock(&self.outstanding)
            .get(&event_number)
            .map(|o| o.args.clone())
    }

    pub fn set_event_response(&self, event_number: usize, response: String) -> bool {
        match lock(&self.outstanding).get_mut(&event_number) {
            Some(o) => {
                o.response = Some(response);
                true
            }
            None => false,
        }
    }

    /// Drop bindings and outstanding events, and fail pending calls.
    pub fn release(&self) {
        lock(&self.bindings).clear();
        lock(&self.outstanding).clear();
        self.pending.fail_all();
    }
}
