//! Bridge engine between a native process and a browser-rendered UI.
//!
//! Provides:
//! - A window registry with per-window configuration and display state
//! - Element bindings: browser events invoke native callbacks
//! - Blocking, correlated script calls from native code into the browser
//! - A transport-agnostic channel layer and event dispatcher
//! - A lifecycle gate for waiting until every window has closed

pub mod binding;
pub mod bridge;
pub mod buffers;
pub mod channel;
pub mod codec;
pub mod content;
mod dispatch;
pub mod events;
pub mod launcher;
mod lifecycle;
mod pending;
pub mod protocol;
mod sync;

pub use binding::Handler;
pub use bridge::{Bridge, DisplayState, Icon, Profile, TlsMaterial, WindowSettings};
pub use buffers::{BufferId, Buffers};
pub use channel::{Inbound, MemoryTransport, Transport};
pub use codec::{decode, encode, Argument, Arguments};
pub use content::{Asset, FileHandler, ShowContent};
pub use events::{Event, EventKind, RawEvent};
pub use launcher::{LaunchRequest, Launched, Launcher, NoBrowser};
pub use protocol::{InboundFrame, OutboundFrame};

pub use wicket_common::{BindId, BridgeError, ChannelError, ScriptError, WindowId};
