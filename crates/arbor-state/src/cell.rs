//! Primitive store: the degenerate single-value case.
//!
//! Non-dictionary root state (or an atomic-marked value used as the whole
//! store) needs no path indexing — a [`CellStore`] holds one value and one
//! subscriber set. Registration, unsubscription and reentrancy follow the
//! same contract as the composite store.

use crate::atom::peel;
use crate::registry::{Registry, Subscription};
use crate::Path;
use serde_json::Value;
use std::sync::{Arc, Mutex};

struct CellInner {
    value: Mutex<Value>,
    registry: Registry,
}

/// Single-value reactive store.
///
/// Cheap to clone; clones share the same value and subscriber set.
///
/// # Examples
///
/// ```
/// use arbor_state::CellStore;
/// use serde_json::json;
///
/// let store = CellStore::new(json!(0));
/// store.update(|v| json!(v.as_i64().unwrap() + 1));
/// assert_eq!(store.get(), json!(1));
/// ```
#[derive(Clone)]
pub struct CellStore {
    inner: Arc<CellInner>,
}

impl CellStore {
    /// Create a store holding a single resolved value.
    pub fn new(initial: Value) -> Self {
        Self {
            inner: Arc::new(CellInner {
                value: Mutex::new(initial),
                registry: Registry::new(),
            }),
        }
    }

    /// The current value (atomic markers stripped).
    pub fn get(&self) -> Value {
        peel(&self.inner.value.lock().unwrap())
    }

    /// Replace the value wholesale and notify every subscriber.
    pub fn set(&self, value: Value) {
        let payload = peel(&value);
        *self.inner.value.lock().unwrap() = value;
        self.inner.registry.dispatch(&Path::root(), &payload);
    }

    /// Compute the next value from the current one.
    pub fn update(&self, f: impl FnOnce(&Value) -> Value) {
        let current = self.get();
        self.set(f(&current));
    }

    /// Register an observer; with `immediate`, it is invoked once
    /// synchronously with the current value before this returns.
    pub fn subscribe(
        &self,
        subscriber: impl Fn(&Value) + Send + Sync + 'static,
        immediate: bool,
    ) -> Subscription {
        let subscriber: Arc<dyn Fn(&Value) + Send + Sync> = Arc::new(subscriber);
        let subscription = self
            .inner
            .registry
            .subscribe(Path::root(), Arc::clone(&subscriber));
        if immediate {
            subscriber(&self.get());
        }
        subscription
    }
}

impl std::fmt::Debug for CellStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_and_get() {
        let store = CellStore::new(json!("initial"));
        assert_eq!(store.get(), json!("initial"));
        store.set(json!("next"));
        assert_eq!(store.get(), json!("next"));
    }

    #[test]
    fn test_subscribers_see_every_set() {
        let store = CellStore::new(json!(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = Arc::clone(&seen);
        let sub = store.subscribe(move |v| seen_cb.lock().unwrap().push(v.clone()), false);

        store.set(json!(1));
        store.set(json!(2));
        sub.unsubscribe();
        store.set(json!(3));

        assert_eq!(seen.lock().unwrap().as_slice(), &[json!(1), json!(2)]);
    }

    #[test]
    fn test_immediate_subscription() {
        let store = CellStore::new(json!(7));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = Arc::clone(&seen);
        let _sub = store.subscribe(move |v| seen_cb.lock().unwrap().push(v.clone()), true);
        assert_eq!(seen.lock().unwrap().as_slice(), &[json!(7)]);
    }
}
