//! Channel layer: the transport seam and the per-channel threads.
//!
//! A collaborator (the WebSocket server, an embedding, a test) implements
//! [`Transport`] for outbound frames and pushes inbound frames through the
//! [`Inbound`] handle returned by `Bridge::attach_channel`. Each attached
//! channel gets two threads:
//! - a reader, which applies connection state, resolves script responses
//!   and fails pending calls on disconnect without waiting for callbacks
//! - a dispatch worker, which runs callbacks in arrival order

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};
use wicket_common::{ChannelError, WindowId};

use crate::bridge::{Bridge, Window};
use crate::dispatch;
use crate::pending::CallOutcome;
use crate::protocol::{InboundFrame, OutboundFrame};
use crate::sync::lock;

/// Outbound half of a channel, implemented by the transport collaborator.
pub trait Transport: Send + Sync {
    fn send(&self, frame: &OutboundFrame) -> Result<(), ChannelError>;

    /// Tear the connection down. Further sends may fail with `Closed`.
    fn close(&self);
}

/// Inbound half of a channel. Dropping every clone ends the channel, which
/// the bridge treats as a disconnect.
#[derive(Debug, Clone)]
pub struct Inbound {
    window: WindowId,
    tx: Sender<InboundFrame>,
}

impl Inbound {
    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn deliver(&self, frame: InboundFrame) -> Result<(), ChannelError> {
        self.tx.send(frame).map_err(|_| ChannelError::Closed)
    }

    /// Parse and deliver a JSON text frame. Malformed frames are logged and
    /// dropped.
    pub fn deliver_json(&self, raw: &str) -> Result<(), ChannelError> {
        match InboundFrame::from_json(raw) {
            Some(frame) => self.deliver(frame),
            None => {
                debug!(window = %self.window, "dropping malformed frame");
                Ok(())
            }
        }
    }
}

/// The channel currently attached to a window.
#[derive(Clone)]
pub(crate) struct Channel {
    pub generation: u64,
    pub transport: Arc<dyn Transport>,
}

/// Start the reader and dispatch worker for a freshly attached channel.
pub(crate) fn spawn(
    bridge: Bridge,
    window: Arc<Window>,
    channel: Channel,
) -> std::io::Result<Inbound> {
    let (tx, rx) = mpsc::channel();
    let (work_tx, work_rx) = mpsc::channel();
    let id = window.id;

    {
        let bridge = bridge.clone();
        let window = Arc::clone(&window);
        let channel = channel.clone();
        thread::Builder::new()
            .name(format!("wicket-dispatch-{id}"))
            .spawn(move || dispatch::run_worker(bridge, window, channel, work_rx))?;
    }

    thread::Builder::new()
        .name(format!("wicket-chan-{id}"))
        .spawn(move || read_loop(bridge, window, channel, rx, work_tx))?;

    Ok(Inbound { window: id, tx })
}

fn read_loop(
    bridge: Bridge,
    window: Arc<Window>,
    channel: Channel,
    rx: Receiver<InboundFrame>,
    work_tx: Sender<InboundFrame>,
) {
    let generation = channel.generation;
    loop {
        let frame = rx.recv().unwrap_or(InboundFrame::Disconnected);
        trace!(window = %window.id, generation, kind = frame.kind(), "inbound frame");
        match frame {
            InboundFrame::ScriptResponse {
                call_number,
                error,
                data,
            } => {
                if !window.is_current(generation) {
                    continue;
                }
                let outcome = if error {
                    CallOutcome::ScriptFailed(data)
                } else {
                    CallOutcome::Response(data)
                };
                if !window.pending.resolve(call_number, outcome) {
                    trace!(window = %window.id, call_number, "discarding unmatched script response");
                }
            }
            InboundFrame::Ping => {
                if let Err(e) = channel.transport.send(&OutboundFrame::Pong) {
                    debug!(window = %window.id, error = %e, "pong failed");
                }
            }
            InboundFrame::Connected => {
                window.mark_connected(generation, &bridge.shared.gate);
                if work_tx.send(InboundFrame::Connected).is_err() {
                    break;
                }
            }
            InboundFrame::Disconnected => {
                // A replaced or closed channel ends silently.
                if window.mark_disconnected(generation, &bridge.shared.gate) {
                    let failed = window.pending.fail_generation(generation);
                    if failed > 0 {
                        debug!(window = %window.id, failed, "failed pending calls on disconnect");
                    }
                    let _ = work_tx.send(InboundFrame::Disconnected);
                }
                break;
            }
            other => {
                if work_tx.send(other).is_err() {
                    break;
                }
            }
        }
    }
    trace!(window = %window.id, generation, "channel reader finished");
}

// =============================================================================
// In-memory transport
// =============================================================================

#[derive(Default)]
struct MemoryState {
    sent: Vec<OutboundFrame>,
    closed: bool,
}

/// Transport that records outbound frames in memory. Useful for embedding
/// the bridge behind a custom transport loop, and for tests.
#[derive(Default)]
pub struct MemoryTransport {
    state: Mutex<MemoryState>,
    changed: Condvar,
}

impl MemoryTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every frame sent so far.
    pub fn sent(&self) -> Vec<OutboundFrame> {
        lock(&self.state).sent.clone()
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }

    /// Block until a sent frame matches `pred`, returning a clone of it.
    pub fn wait_for<F>(&self, timeout: Duration, mut pred: F) -> Option<OutboundFrame>
    where
        F: FnMut(&OutboundFrame) -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut state = lock(&self.state);
        loop {
            if let Some(frame) = state.sent.iter().find(|f| pred(f)) {
                return Some(frame.clone());
            }
            let remaining = deadline.checked_duration_since(Instant::now())?;
            state = self
                .changed
                .wait_timeout(state, remaining)
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .0;
        }
    }
}

impl Transport for MemoryTransport {
    fn send(&self, frame: &OutboundFrame) -> Result<(), ChannelError> {
        let mut state = lock(&self.state);
        if state.closed {
            return Err(ChannelError::Closed);
        }
        state.sent.push(frame.clone());
        self.changed.notify_all();
        Ok(())
    }

    fn close(&self) {
        lock(&self.state).closed = true;
        self.changed.notify_all();
    }
}
