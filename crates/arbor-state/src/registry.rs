//! Path-keyed subscriber registry.
//!
//! Subscriber sets are created lazily per path and persist for the lifetime
//! of the store. Dispatch is reentrancy-safe: the entry list is snapshotted
//! before iteration, subscribers added during a pass are not invoked for the
//! event already in flight, and a subscriber removed mid-pass is never
//! invoked after its unsubscription.

use crate::Path;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// A registered state observer.
pub type Subscriber = Arc<dyn Fn(&Value) + Send + Sync>;

struct Entry {
    id: u64,
    subscriber: Subscriber,
}

type Table = Mutex<HashMap<Path, Vec<Entry>>>;

/// Path-keyed subscriber sets, lazily populated.
#[derive(Default)]
pub(crate) struct Registry {
    table: Arc<Table>,
    next_id: AtomicU64,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber under a path. Never fails, including while a
    /// notification pass over the same path is in progress.
    pub(crate) fn subscribe(&self, path: Path, subscriber: Subscriber) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut table = self.table.lock().unwrap();
        table
            .entry(path.clone())
            .or_default()
            .push(Entry { id, subscriber });
        tracing::trace!(path = %path, id, "subscriber registered");
        Subscription {
            table: Arc::downgrade(&self.table),
            path,
            id,
        }
    }

    /// Every path that currently has a subscriber set (possibly empty ones
    /// left behind by unsubscription — entries persist for the store's
    /// lifetime).
    pub(crate) fn paths(&self) -> Vec<Path> {
        self.table.lock().unwrap().keys().cloned().collect()
    }

    /// Invoke every subscriber registered under `path` with `value`.
    ///
    /// The subscriber set is snapshotted at the start of the pass; each
    /// callback's registration is re-checked right before it runs so that
    /// unsubscriptions performed by earlier callbacks take effect within the
    /// same event.
    pub(crate) fn dispatch(&self, path: &Path, value: &Value) {
        let pass: Vec<(u64, Subscriber)> = {
            let table = self.table.lock().unwrap();
            match table.get(path) {
                Some(entries) => entries
                    .iter()
                    .map(|e| (e.id, Arc::clone(&e.subscriber)))
                    .collect(),
                None => return,
            }
        };

        for (id, subscriber) in pass {
            let still_registered = {
                let table = self.table.lock().unwrap();
                table
                    .get(path)
                    .is_some_and(|entries| entries.iter().any(|e| e.id == id))
            };
            if still_registered {
                subscriber(value);
            }
        }
    }
}

/// Handle to an active subscription, returned from `subscribe`.
///
/// Call [`Subscription::unsubscribe`] to remove the callback. Dropping the
/// handle does *not* unsubscribe: a caller that never unsubscribes keeps a
/// strong reference to its callback alive for the lifetime of the store.
#[must_use = "dropping a Subscription does not unsubscribe; call unsubscribe() when done"]
pub struct Subscription {
    table: Weak<Table>,
    path: Path,
    id: u64,
}

impl Subscription {
    /// Remove the subscriber from the registry.
    ///
    /// Safe to call at any time, including from inside a notification pass;
    /// a no-op if the owning store has already been dropped.
    pub fn unsubscribe(self) {
        let Some(table) = self.table.upgrade() else {
            return;
        };
        let mut table = table.lock().unwrap();
        if let Some(entries) = table.get_mut(&self.path) {
            entries.retain(|e| e.id != self.id);
        }
        tracing::trace!(path = %self.path, id = self.id, "subscriber removed");
    }
}
