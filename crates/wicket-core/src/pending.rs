//! In-flight native -> browser script calls of one window.
//!
//! Each call owns a one-shot rendezvous channel. The entry is removed from
//! the table by whoever resolves it first (response, disconnect, or the
//! caller's own timeout), so a call resolves exactly once.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::Mutex;
use std::time::Duration;

use tracing::trace;
use wicket_common::ScriptError;

use crate::sync::lock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CallOutcome {
    Response(String),
    ScriptFailed(String),
    Disconnected,
}

impl CallOutcome {
    fn into_result(self) -> Result<String, ScriptError> {
        match self {
            Self::Response(data) => Ok(data),
            Self::ScriptFailed(data) => Err(ScriptError::Failed(data)),
            Self::Disconnected => Err(ScriptError::Disconnected),
        }
    }
}

/// Handle held by the blocked caller.
pub(crate) struct PendingCall {
    pub call_number: usize,
    rx: Receiver<CallOutcome>,
}

struct Entry {
    /// Channel generation the script was sent on.
    generation: u64,
    tx: SyncSender<CallOutcome>,
}

#[derive(Default)]
struct Inner {
    last: usize,
    calls: HashMap<usize, Entry>,
}

#[derive(Default)]
pub(crate) struct PendingCalls {
    inner: Mutex<Inner>,
}

impl PendingCalls {
    /// Allocate a call number not currently outstanding on behalf of the
    /// channel `generation`. `0` is reserved for fire-and-forget scripts.
    pub fn register(&self, generation: u64) -> PendingCall {
        let (tx, rx) = mpsc::sync_channel(1);
        let mut inner = lock(&self.inner);
        let mut n = inner.last;
        loop {
            n = n.wrapping_add(1);
            if n != 0 && !inner.calls.contains_key(&n) {
                break;
            }
        }
        inner.last = n;
        inner.calls.insert(n, Entry { generation, tx });
        PendingCall { call_number: n, rx }
    }

    /// Resolve a call. Returns `false` if the number is unknown or the call
    /// was already resolved.
    pub fn resolve(&self, call_number: usize, outcome: CallOutcome) -> bool {
        let mut inner = lock(&self.inner);
        match inner.calls.remove(&call_number) {
            Some(entry) => {
                // Capacity 1 and a single sender: never full. A gone
                // receiver means the caller already timed out.
                let _ = entry.tx.try_send(outcome);
                true
            }
            None => false,
        }
    }

    /// Drop a call without resolving it. Returns `false` if it was already
    /// resolved.
    pub fn cancel(&self, call_number: usize) -> bool {
        lock(&self.inner).calls.remove(&call_number).is_some()
    }

    /// Resolve every outstanding call as disconnected.
    pub fn fail_all(&self) -> usize {
        let mut inner = lock(&self.inner);
        let count = inner.calls.len();
        for (_, entry) in inner.calls.drain() {
            let _ = entry.tx.try_send(CallOutcome::Disconnected);
        }
        count
    }

    /// Resolve as disconnected every call sent on `generation` or an earlier
    /// channel. Calls on newer channels are left alone.
    pub fn fail_generation(&self, generation: u64) -> usize {
        let mut inner = lock(&self.inner);
        let ended: Vec<usize> = inner
            .calls
            .iter()
            .filter(|(_, entry)| entry.generation <= generation)
            .map(|(n, _)| *n)
            .collect();
        for n in &ended {
            if let Some(entry) = inner.calls.remove(n) {
                let _ = entry.tx.try_send(CallOutcome::Disconnected);
            }
        }
        ended.len()
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).calls.len()
    }

    /// Block until `call` resolves. A zero `timeout` waits forever.
    pub fn wait(&self, call: PendingCall, timeout: Duration) -> Result<String, ScriptError> {
        let PendingCall { call_number, rx } = call;
        if timeout.is_zero() {
            return rx
                .recv()
                .map_err(|_| ScriptError::Disconnected)
                .and_then(CallOutcome::into_result);
        }
        match rx.recv_timeout(timeout) {
            Ok(outcome) => outcome.into_result(),
            Err(RecvTimeoutError::Timeout) => {
                if self.cancel(call_number) {
                    trace!(call_number, "script call timed out");
                    return Err(ScriptError::Timeout);
                }
                // Resolved between the deadline and the cancel.
                rx.try_recv()
                    .map_err(|_| ScriptError::Timeout)
                    .and_then(CallOutcome::into_result)
            }
            Err(RecvTimeoutError::Disconnected) => Err(ScriptError::Disconnected),
        }
    }
}
