//! Per-channel dispatch worker: turns inbound frames into callback
//! invocations and sends callback responses back.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use tracing::{debug, error, trace, warn};
use wicket_common::BindId;

use crate::binding::Binding;
use crate::bridge::{Bridge, Window};
use crate::channel::Channel;
use crate::codec::{Argument, Arguments};
use crate::events::{Event, EventKind};
use crate::protocol::{InboundFrame, OutboundFrame};

pub(crate) fn run_worker(
    bridge: Bridge,
    window: Arc<Window>,
    channel: Channel,
    frames: Receiver<InboundFrame>,
) {
    for frame in frames {
        if window.is_superseded(channel.generation) {
            trace!(window = %window.id, kind = frame.kind(), "ignoring frame from superseded channel");
            continue;
        }
        match frame {
            InboundFrame::Connected => {
                debug!(window = %window.id, generation = channel.generation, "window connected");
                notify(&bridge, &window, EventKind::Connected);
            }
            InboundFrame::Disconnected => {
                debug!(window = %window.id, generation = channel.generation, "window disconnected");
                notify(&bridge, &window, EventKind::Disconnected);
                break;
            }
            InboundFrame::Click {
                event_number,
                element,
                args,
            } => handle_event(
                &bridge,
                &window,
                &channel,
                EventKind::Click,
                element,
                event_number,
                args,
            ),
            InboundFrame::Call {
                event_number,
                element,
                args,
            } => handle_event(
                &bridge,
                &window,
                &channel,
                EventKind::Callback,
                element,
                event_number,
                args,
            ),
            InboundFrame::Navigation { url } => handle_event(
                &bridge,
                &window,
                &channel,
                EventKind::Navigation,
                String::new(),
                0,
                vec![Argument::Text(url)],
            ),
            InboundFrame::Unknown => debug!(window = %window.id, "ignoring unknown frame"),
            // Handled on the reader.
            InboundFrame::ScriptResponse { .. } | InboundFrame::Ping => {}
        }
    }
    trace!(window = %window.id, generation = channel.generation, "dispatch worker finished");
}

/// Connection state is applied by the reader; the worker only tells the
/// wildcard binding.
fn notify(bridge: &Bridge, window: &Window, kind: EventKind) {
    let Some(binding) = window.wildcard() else {
        return;
    };
    let mut event = Event::new(
        bridge.clone(),
        window.id,
        kind,
        String::new(),
        0,
        binding.bind_id,
        Arguments::default(),
    );
    invoke(&binding, &mut event);
}

fn handle_event(
    bridge: &Bridge,
    window: &Window,
    channel: &Channel,
    kind: EventKind,
    element: String,
    event_number: usize,
    args: Vec<Argument>,
) {
    let args = Arguments::from(args);
    if !window.begin_event(event_number, args.clone()) {
        warn!(window = %window.id, event_number, "duplicate outstanding event number, dropping");
        return;
    }

    let binding = window.resolve_binding(&element);
    let mut event = Event::new(
        bridge.clone(),
        window.id,
        kind,
        element,
        event_number,
        binding.as_ref().map_or(BindId::INVALID, |b| b.bind_id),
        args,
    );
    match &binding {
        Some(binding) => invoke(binding, &mut event),
        None => trace!(window = %window.id, element = %event.element, "no binding for element"),
    }

    let raw_response = window.end_event(event_number);
    if !kind.expects_response() {
        return;
    }
    let value = event
        .take_response()
        .or_else(|| raw_response.map(Argument::Text))
        .unwrap_or_else(Argument::empty);
    let frame = OutboundFrame::CallResponse {
        event_number,
        value,
    };
    if let Err(e) = channel.transport.send(&frame) {
        debug!(window = %window.id, event_number, error = %e, "failed to send call response");
    }
}

fn invoke(binding: &Binding, event: &mut Event) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| binding.handler.invoke(event)));
    if result.is_err() {
        error!(
            window = %event.window,
            element = %event.element,
            bind_id = %binding.bind_id,
            "callback panicked"
        );
    }
}
