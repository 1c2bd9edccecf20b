//! Store nodes: accessor handles bound to one path.
//!
//! A [`Node`] owns no state beyond its bound path — every read resolves
//! against the store's live snapshot at call time, and every write re-enters
//! the engine through the merge policy and the notification protocol. Nodes
//! are cheap to clone and compare equal when they address the same location
//! of the same store.

use crate::atom::{is_marker_key, peel};
use crate::error::ArborResult;
use crate::merge::{combine, replace};
use crate::path::parse_path;
use crate::registry::Subscription;
use crate::store::TreeInner;
use crate::Path;
use serde_json::Value;
use std::sync::Arc;

/// Accessor handle for one location in a [`TreeStore`](crate::TreeStore).
#[derive(Clone)]
pub struct Node {
    inner: Arc<TreeInner>,
    path: Path,
}

impl Node {
    pub(crate) fn new(inner: Arc<TreeInner>, path: Path) -> Self {
        Self { inner, path }
    }

    /// The path this node is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the value at this node's path from the current snapshot.
    ///
    /// Lenient: an absent path reads as `Value::Null`. Atomic markers are
    /// stripped from the result.
    pub fn get(&self) -> Value {
        peel(&self.inner.resolve_raw(&self.path).unwrap_or(Value::Null))
    }

    /// Read the value at this node's path, transformed by a selector.
    pub fn get_with<R>(&self, selector: impl FnOnce(&Value) -> R) -> R {
        selector(&self.get())
    }

    /// Deserialize the value at this node's path into a typed value.
    pub fn get_as<T: serde::de::DeserializeOwned>(&self) -> ArborResult<T> {
        Ok(serde_json::from_value(self.get())?)
    }

    /// The enumerable keys of the value at this node's path.
    ///
    /// Exactly the underlying data's keys: internal bookkeeping never
    /// appears here, and non-dictionary values have no keys.
    pub fn keys(&self) -> Vec<String> {
        match self.inner.resolve_raw(&self.path) {
            Some(Value::Object(obj)) => obj
                .keys()
                .filter(|k| !is_marker_key(k))
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Write a value at this node's path.
    ///
    /// The next value is computed by the merge policy: the coarse
    /// [`combine`] for whole-state writes at the root, the recursive
    /// [`replace`] for nested writes. The snapshot swap and all
    /// notifications complete before this returns.
    pub fn set(&self, value: Value) -> ArborResult<()> {
        let current = self.inner.resolve_raw(&self.path).unwrap_or(Value::Null);
        let next = if self.path.is_root() {
            combine(&current, &value)
        } else {
            replace(&current, &value)
        };
        self.inner.set_property(next, &self.path)
    }

    /// Compute the next value from the current one, then write it.
    ///
    /// The updater sees the peeled current value; its result goes through
    /// the recursive [`replace`] policy like any other write.
    pub fn update(&self, f: impl FnOnce(&Value) -> Value) -> ArborResult<()> {
        let current = self.inner.resolve_raw(&self.path).unwrap_or(Value::Null);
        let next = replace(&current, &f(&peel(&current)));
        self.inner.set_property(next, &self.path)
    }

    /// Register an observer for this node's path.
    ///
    /// With `immediate`, the subscriber is invoked once synchronously with
    /// the current value before this returns. The returned [`Subscription`]
    /// is the only way to unregister; see its docs for the leak contract.
    pub fn subscribe(
        &self,
        subscriber: impl Fn(&Value) + Send + Sync + 'static,
        immediate: bool,
    ) -> Subscription {
        self.inner
            .subscribe(self.path.clone(), Arc::new(subscriber), immediate)
    }

    /// The node for a child path, computed lazily.
    ///
    /// Supports dynamic access beyond the statically known shape:
    /// `node.key("a.b")` and `node.key("a").key("b")` address the same
    /// location and compare equal.
    pub fn key(&self, child: &str) -> Node {
        Node {
            inner: Arc::clone(&self.inner),
            path: self.path.join(&parse_path(child)),
        }
    }

    /// The external-store contract point: the subscribe/snapshot pair a
    /// framework binding needs, plus a setter, all bound to this path.
    pub fn bind(&self) -> Binding {
        Binding { node: self.clone() }
    }

    /// Current value through a selector, paired with a [`Setter`] — the
    /// value/setter tuple a binding layer hands to application code.
    pub fn use_value<R>(&self, selector: impl FnOnce(&Value) -> R) -> (R, Setter) {
        (self.get_with(selector), Setter { node: self.clone() })
    }
}

impl PartialEq for Node {
    /// Two nodes are the same accessor when they belong to the same store
    /// and are bound to the same path.
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) && self.path == other.path
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node").field("path", &self.path).finish()
    }
}

/// Write-only handle bound to a node's path.
#[derive(Clone, Debug)]
pub struct Setter {
    node: Node,
}

impl Setter {
    /// Write a value through the merge policy.
    pub fn set(&self, value: Value) -> ArborResult<()> {
        self.node.set(value)
    }

    /// Compute the next value from the current one.
    pub fn update(&self, f: impl FnOnce(&Value) -> Value) -> ArborResult<()> {
        self.node.update(f)
    }
}

/// The subscribe/getSnapshot pair for one path, consumed by framework
/// bindings that follow the external-store pattern.
#[derive(Clone, Debug)]
pub struct Binding {
    node: Node,
}

impl Binding {
    /// Current value at the bound path.
    pub fn snapshot(&self) -> Value {
        self.node.get()
    }

    /// Register a change callback; no immediate invocation, matching the
    /// external-store subscribe contract.
    pub fn subscribe(&self, callback: impl Fn(&Value) + Send + Sync + 'static) -> Subscription {
        self.node.subscribe(callback, false)
    }

    /// Write-side companion to the snapshot.
    pub fn setter(&self) -> Setter {
        Setter {
            node: self.node.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::atom;
    use crate::TreeStore;
    use serde_json::json;

    #[test]
    fn test_get_resolves_live_snapshot() {
        let store = TreeStore::new(json!({"user": {"name": "John"}}));
        let name = store.node("user.name");

        assert_eq!(name.get(), json!("John"));
        store.node("user").set(json!({"name": "Jane"})).unwrap();
        // Same handle, new snapshot.
        assert_eq!(name.get(), json!("Jane"));
    }

    #[test]
    fn test_get_absent_path_is_null() {
        let store = TreeStore::new(json!({}));
        assert_eq!(store.node("missing.deep").get(), Value::Null);
    }

    #[test]
    fn test_get_with_selector() {
        let store = TreeStore::new(json!({"count": 2}));
        let doubled = store.node("count").get_with(|v| v.as_i64().unwrap() * 2);
        assert_eq!(doubled, 4);
    }

    #[test]
    fn test_get_as_typed() {
        let store = TreeStore::new(json!({"count": 2}));
        assert_eq!(store.node("count").get_as::<i64>().unwrap(), 2);
    }

    #[test]
    fn test_keys_exclude_marker() {
        let store = TreeStore::new(json!({"prefs": atom(json!({"theme": "dark"}))}));
        assert_eq!(store.node("prefs").keys(), vec!["theme"]);
        assert_eq!(store.root().keys(), vec!["prefs"]);
        assert!(store.node("prefs.theme").keys().is_empty());
    }

    #[test]
    fn test_update() {
        let store = TreeStore::new(json!({"count": 1}));
        store
            .node("count")
            .update(|v| json!(v.as_i64().unwrap() + 1))
            .unwrap();
        assert_eq!(store.node("count").get(), json!(2));
    }

    #[test]
    fn test_key_equivalence() {
        let store = TreeStore::new(json!({"a": {"b": {"c": 1}}}));
        assert_eq!(store.root().key("a.b"), store.root().key("a").key("b"));
        assert_eq!(store.node("a.b.c").get(), json!(1));
    }

    #[test]
    fn test_nodes_of_different_stores_differ() {
        let store_a = TreeStore::new(json!({"x": 1}));
        let store_b = TreeStore::new(json!({"x": 1}));
        assert_ne!(store_a.node("x"), store_b.node("x"));
    }

    #[test]
    fn test_binding_pair() {
        let store = TreeStore::new(json!({"count": 0}));
        let binding = store.node("count").bind();

        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen_cb = std::sync::Arc::clone(&seen);
        let sub = binding.subscribe(move |v| seen_cb.lock().unwrap().push(v.clone()));

        // No immediate call.
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(binding.snapshot(), json!(0));

        binding.setter().set(json!(5)).unwrap();
        assert_eq!(seen.lock().unwrap().as_slice(), &[json!(5)]);
        assert_eq!(binding.snapshot(), json!(5));
        sub.unsubscribe();
    }

    #[test]
    fn test_use_value() {
        let store = TreeStore::new(json!({"count": 3}));
        let (value, setter) = store.node("count").use_value(|v| v.as_i64().unwrap());
        assert_eq!(value, 3);
        setter.update(|v| json!(v.as_i64().unwrap() + 1)).unwrap();
        assert_eq!(store.node("count").get(), json!(4));
    }
}
