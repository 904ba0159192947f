//! Events delivered to bound callbacks.

use crate::bridge::Bridge;
use crate::codec::{Argument, Arguments};
use wicket_common::{BindId, WindowId};

/// Kind of a browser event. The numeric codes are stable and are what
/// raw handlers receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Disconnected = 0,
    Connected = 1,
    Click = 2,
    Navigation = 3,
    Callback = 4,
}

impl EventKind {
    pub fn code(self) -> usize {
        self as usize
    }

    /// Whether the browser waits for a `CallResponse` after this event.
    pub fn expects_response(self) -> bool {
        matches!(self, Self::Click | Self::Callback)
    }
}

/// One browser event handed to a callback.
///
/// A callback may set a return value with one of the `return_*` methods;
/// the last one set wins. The carried [`Bridge`] lets a callback issue
/// further bridge calls, including blocking scripts to the same window.
pub struct Event {
    pub window: WindowId,
    pub kind: EventKind,
    pub element: String,
    pub event_number: usize,
    pub bind_id: BindId,
    args: Arguments,
    response: Option<Argument>,
    bridge: Bridge,
}

impl Event {
    pub(crate) fn new(
        bridge: Bridge,
        window: WindowId,
        kind: EventKind,
        element: String,
        event_number: usize,
        bind_id: BindId,
        args: Arguments,
    ) -> Self {
        Self {
            window,
            kind,
            element,
            event_number,
            bind_id,
            args,
            response: None,
            bridge,
        }
    }

    pub fn args(&self) -> &Arguments {
        &self.args
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    pub fn int_at(&self, index: usize) -> i64 {
        self.args.int_at(index)
    }

    pub fn string_at(&self, index: usize) -> String {
        self.args.string_at(index)
    }

    pub fn bool_at(&self, index: usize) -> bool {
        self.args.bool_at(index)
    }

    pub fn size_at(&self, index: usize) -> usize {
        self.args.size_at(index)
    }

    pub fn int(&self) -> i64 {
        self.int_at(0)
    }

    pub fn string(&self) -> String {
        self.string_at(0)
    }

    pub fn bool(&self) -> bool {
        self.bool_at(0)
    }

    pub fn size(&self) -> usize {
        self.size_at(0)
    }

    pub fn return_int(&mut self, value: i64) {
        self.response = Some(Argument::Int(value));
    }

    pub fn return_string(&mut self, value: impl Into<String>) {
        self.response = Some(Argument::Text(value.into()));
    }

    pub fn return_bool(&mut self, value: bool) {
        self.response = Some(Argument::Bool(value));
    }

    pub fn response(&self) -> Option<&Argument> {
        self.response.as_ref()
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    pub(crate) fn take_response(&mut self) -> Option<Argument> {
        self.response.take()
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("window", &self.window)
            .field("kind", &self.kind)
            .field("element", &self.element)
            .field("event_number", &self.event_number)
            .field("bind_id", &self.bind_id)
            .field("args", &self.args)
            .field("response", &self.response)
            .finish()
    }
}

/// Primitive view of an event, for handlers bound with `bind_raw`.
/// Arguments are read back through the bridge's `interface_*_at` accessors
/// using `(window, event_number)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub window: usize,
    pub event_type: usize,
    pub element: String,
    pub event_number: usize,
    pub bind_id: usize,
}

impl From<&Event> for RawEvent {
    fn from(event: &Event) -> Self {
        Self {
            window: event.window.0,
            event_type: event.kind.code(),
            element: event.element.clone(),
            event_number: event.event_number,
            bind_id: event.bind_id.0,
        }
    }
}
