//! Process-wide "any window still open" state.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::sync::lock;

#[derive(Debug, Default)]
struct GateState {
    shown: usize,
    exit_requested: bool,
}

impl GateState {
    fn done(&self) -> bool {
        self.shown == 0 || self.exit_requested
    }
}

/// Count of shown windows plus the exit flag, guarded together so that
/// waiters never miss the transition to zero.
#[derive(Debug, Default)]
pub(crate) struct LifecycleGate {
    state: Mutex<GateState>,
    changed: Condvar,
}

impl LifecycleGate {
    pub fn window_opened(&self) {
        lock(&self.state).shown += 1;
        self.changed.notify_all();
    }

    pub fn window_closed(&self) {
        let mut state = lock(&self.state);
        state.shown = state.shown.saturating_sub(1);
        if state.shown == 0 {
            self.changed.notify_all();
        }
    }

    pub fn request_exit(&self) {
        lock(&self.state).exit_requested = true;
        self.changed.notify_all();
    }

    pub fn exit_requested(&self) -> bool {
        lock(&self.state).exit_requested
    }

    pub fn shown(&self) -> usize {
        lock(&self.state).shown
    }

    /// Block until no window is shown or exit was requested.
    pub fn wait(&self) {
        let guard = lock(&self.state);
        let _guard = self
            .changed
            .wait_while(guard, |state| !state.done())
            .unwrap_or_else(std::sync::PoisonError::into_inner);
    }

    /// Block until at least one window is shown or exit was requested.
    pub fn wait_shown(&self) {
        let guard = lock(&self.state);
        let _guard = self
            .changed
            .wait_while(guard, |state| state.shown == 0 && !state.exit_requested)
            .unwrap_or_else(std::sync::PoisonError::into_inner);
    }

    /// Like [`wait`](Self::wait) with a deadline. Returns `true` if the gate
    /// opened before the deadline.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = lock(&self.state);
        let (state, _) = self
            .changed
            .wait_timeout_while(guard, timeout, |state| !state.done())
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state.done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn wait_returns_immediately_with_no_windows() {
        let gate = LifecycleGate::default();
        gate.wait();
        assert!(gate.wait_timeout(Duration::from_millis(1)));
    }

    #[test]
    fn closing_last_window_wakes_all_waiters() {
        let gate = Arc::new(LifecycleGate::default());
        gate.window_opened();
        gate.window_opened();

        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let gate = Arc::clone(&gate);
                thread::spawn(move || gate.wait_timeout(Duration::from_secs(10)))
            })
            .collect();

        gate.window_closed();
        assert!(!gate.wait_timeout(Duration::from_millis(20)));
        gate.window_closed();

        for waiter in waiters {
            assert!(waiter.join().unwrap());
        }
        assert_eq!(gate.shown(), 0);
    }

    #[test]
    fn exit_wakes_waiters_with_windows_open() {
        let gate = Arc::new(LifecycleGate::default());
        gate.window_opened();

        let waiter = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || gate.wait())
        };
        thread::sleep(Duration::from_millis(20));
        gate.request_exit();
        waiter.join().unwrap();
        assert!(gate.exit_requested());
        assert_eq!(gate.shown(), 1);
    }

    #[test]
    fn count_never_underflows() {
        let gate = LifecycleGate::default();
        gate.window_closed();
        assert_eq!(gate.shown(), 0);
    }

    #[test]
    fn wait_shown_wakes_on_first_window() {
        let gate = Arc::new(LifecycleGate::default());
        let waiter = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || gate.wait_shown())
        };
        thread::sleep(Duration::from_millis(20));
        assert!(!waiter.is_finished());
        gate.window_opened();
        waiter.join().unwrap();
        assert_eq!(gate.shown(), 1);
    }

    #[test]
    fn wait_shown_wakes_on_exit() {
        let gate = Arc::new(LifecycleGate::default());
        let waiter = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || gate.wait_shown())
        };
        gate.request_exit();
        waiter.join().unwrap();
        assert_eq!(gate.shown(), 0);
    }
}
