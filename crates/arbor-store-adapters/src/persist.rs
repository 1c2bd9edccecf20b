//! Glue between a live store and a storage adapter.
//!
//! Seeding happens before construction: [`load_or`] reads the stored value
//! (through the adapter's usage transform) so the caller can hand a resolved
//! snapshot to `create_store`. After construction, [`persist`] registers a
//! non-immediate root subscription and forwards every new snapshot to the
//! adapter's `set_item` from a background task.

use crate::contract::{AdapterError, StorageAdapter};
use arbor_state::{Store, Subscription, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Read the stored state for a key, falling back to a default.
///
/// Adapter failures propagate; a missing key is not a failure.
pub async fn load_or<A: StorageAdapter + ?Sized>(
    adapter: &A,
    key: &str,
    default: Value,
) -> Result<Value, AdapterError> {
    match adapter.get_item(key).await? {
        Some(stored) => Ok(adapter.usage_transform(stored)),
        None => Ok(default),
    }
}

/// Push every subsequent state change of `store` to the adapter.
///
/// The subscription is non-immediate: only changes made after this call are
/// written. Writes happen on a background task in subscription order; a
/// failed write is logged and does not stop the stream (an adapter wanting
/// retries implements them in `set_item`).
///
/// Must be called within a tokio runtime.
pub fn persist<A>(store: &Store, adapter: Arc<A>, key: impl Into<String>) -> Persistence
where
    A: StorageAdapter + 'static,
{
    let key = key.into();
    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();

    let subscription = store.subscribe(
        move |value| {
            // Receiver gone means the persistence was detached; nothing to do.
            let _ = tx.send(value.clone());
        },
        false,
    );

    let worker = tokio::spawn(async move {
        while let Some(value) = rx.recv().await {
            let stored = adapter.storage_transform(value);
            if let Err(error) = adapter.set_item(&key, stored).await {
                tracing::warn!(key = %key, error = %error, "failed to persist state change");
            }
        }
    });

    Persistence {
        subscription,
        worker,
    }
}

/// Handle to an active store-to-adapter pipeline.
pub struct Persistence {
    subscription: Subscription,
    worker: JoinHandle<()>,
}

impl Persistence {
    /// Stop observing the store, then wait for already-queued writes to
    /// reach the adapter.
    pub async fn detach(self) {
        // Unsubscribing drops the channel sender, which ends the worker
        // after it drains the queue.
        self.subscription.unsubscribe();
        let _ = self.worker.await;
    }
}
