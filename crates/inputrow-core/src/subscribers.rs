//! Change subscriptions
//!
//! Owned, per-row list of callbacks notified with a parameter snapshot after
//! every change.

use crate::spec::Params;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Callback receiving the full parameter snapshot
pub type Subscriber = Arc<dyn Fn(&Params) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub(crate) struct ChangeSubscribers {
    next_id: AtomicU64,
    entries: Mutex<Vec<(SubscriptionId, Subscriber)>>,
}

impl ChangeSubscribers {
    pub(crate) fn subscribe(&self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().push((id, subscriber));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Notify every subscriber in registration order
    ///
    /// A panicking subscriber is logged and skipped; the rest still run.
    pub(crate) fn notify(&self, params: &Params) {
        let entries: Vec<(SubscriptionId, Subscriber)> = self
            .entries
            .lock()
            .iter()
            .map(|(id, subscriber)| (*id, Arc::clone(subscriber)))
            .collect();

        for (id, subscriber) in entries {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| subscriber(params))) {
                tracing::warn!(
                    "Change subscriber {:?} panicked: {}",
                    id,
                    panic_message(panic.as_ref())
                );
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
