//! One-shot readiness signal
//!
//! The tree root fires [`ReadySignal`] once the whole form has been
//! constructed. Nodes that depend on fields elsewhere in the tree register a
//! callback and bind their dependencies when it runs.

use parking_lot::Mutex;
use std::fmt;

/// Callback run when the tree becomes ready
pub type ReadyCallback = Box<dyn FnOnce() + Send>;

enum ReadyState {
    Pending(Vec<ReadyCallback>),
    Fired,
}

/// One-shot "tree ready" event
pub struct ReadySignal {
    state: Mutex<ReadyState>,
}

impl ReadySignal {
    /// Create a signal that has not fired yet
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ReadyState::Pending(Vec::new())),
        }
    }

    /// Register a callback
    ///
    /// Runs on [`fire`](Self::fire), or immediately if the signal already fired.
    pub fn on_ready(&self, callback: ReadyCallback) {
        let mut state = self.state.lock();
        if let ReadyState::Pending(pending) = &mut *state {
            pending.push(callback);
            return;
        }
        drop(state);
        callback();
    }

    /// Fire the signal, running pending callbacks in registration order
    ///
    /// Firing again is a no-op.
    pub fn fire(&self) {
        let previous = std::mem::replace(&mut *self.state.lock(), ReadyState::Fired);
        let ReadyState::Pending(pending) = previous else {
            tracing::debug!("ready signal already fired");
            return;
        };

        tracing::debug!(callbacks = pending.len(), "tree ready");
        for callback in pending {
            callback();
        }
    }

    /// Whether the signal has fired
    #[must_use]
    pub fn is_fired(&self) -> bool {
        matches!(*self.state.lock(), ReadyState::Fired)
    }
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReadySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        let mut out = f.debug_struct("ReadySignal");
        match &*state {
            ReadyState::Pending(pending) => out.field("pending", &pending.len()),
            ReadyState::Fired => out.field("fired", &true),
        };
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn callbacks_run_once_in_order() {
        let signal = ReadySignal::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let log = Arc::clone(&log);
            signal.on_ready(Box::new(move || log.lock().push(i)));
        }
        assert!(log.lock().is_empty());
        assert!(!signal.is_fired());

        signal.fire();
        signal.fire();

        assert_eq!(*log.lock(), vec![0, 1, 2]);
        assert!(signal.is_fired());
    }

    #[test]
    fn late_registration_runs_immediately() {
        let signal = ReadySignal::new();
        signal.fire();

        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        signal.on_ready(Box::new(move || sink.lock().push("late")));

        assert_eq!(*log.lock(), vec!["late"]);
    }

    #[test]
    fn callback_may_register_another() {
        let signal = Arc::new(ReadySignal::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let inner_signal = Arc::clone(&signal);
        let inner_log = Arc::clone(&log);
        signal.on_ready(Box::new(move || {
            inner_log.lock().push("outer");
            let nested = Arc::clone(&inner_log);
            inner_signal.on_ready(Box::new(move || nested.lock().push("nested")));
        }));

        signal.fire();
        assert_eq!(*log.lock(), vec!["outer", "nested"]);
    }
}
