//! Composite store engine and notification protocol.
//!
//! [`TreeStore`] owns the current snapshot and the subscriber registry —
//! store nodes hold nothing beyond their bound path and resolve every read
//! against the live snapshot at call time. Mutations stage a new snapshot,
//! swap it in, then fan out notifications to exactly the affected paths:
//! every ancestor of the changed path, the changed path itself, and every
//! descendant path reachable inside the new value. Root subscribers are
//! notified on every write with the full snapshot; sibling paths are never
//! notified.

use crate::atom::peel;
use crate::error::{value_type_name, ArborError, ArborResult};
use crate::merge::{classify, Shape};
use crate::node::Node;
use crate::path::{descendant_paths, parse_path, path_components, resolve_path};
use crate::registry::{Registry, Subscriber, Subscription};
use crate::tree::NodeTree;
use crate::{CellStore, Path, Seg};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

pub(crate) struct TreeInner {
    snapshot: Mutex<Value>,
    registry: Registry,
}

impl TreeInner {
    /// Clone of the raw snapshot, markers included.
    pub(crate) fn current(&self) -> Value {
        self.snapshot.lock().unwrap().clone()
    }

    /// Raw value at a path, markers included; `None` for absent paths.
    pub(crate) fn resolve_raw(&self, path: &Path) -> Option<Value> {
        let snapshot = self.snapshot.lock().unwrap();
        resolve_path(&snapshot, path).cloned()
    }

    pub(crate) fn subscribe(
        &self,
        path: Path,
        subscriber: Subscriber,
        immediate: bool,
    ) -> Subscription {
        let subscription = self.registry.subscribe(path.clone(), Arc::clone(&subscriber));
        if immediate {
            let value = self.resolve_raw(&path).unwrap_or(Value::Null);
            subscriber(&peel(&value));
        }
        subscription
    }

    /// Swap in a new snapshot and notify every subscriber whose path is in
    /// the fan-out set of the change.
    pub(crate) fn set_state(&self, new_snapshot: Value, changed: &Path) {
        *self.snapshot.lock().unwrap() = new_snapshot.clone();
        let snapshot = new_snapshot;

        let mut fanout: BTreeSet<Path> = path_components(changed).into_iter().collect();
        if let Some(resolved) = resolve_path(&snapshot, changed) {
            for relative in descendant_paths(resolved) {
                fanout.insert(changed.join(&relative));
            }
        }

        let mut registered = self.registry.paths();
        registered.sort();
        tracing::debug!(
            changed = %changed,
            fanout = fanout.len(),
            registered = registered.len(),
            "state updated"
        );

        // Root subscribers always see the entire new snapshot.
        if registered.iter().any(Path::is_root) {
            self.registry.dispatch(&Path::root(), &peel(&snapshot));
        }
        for path in registered {
            if path.is_root() || !fanout.contains(&path) {
                continue;
            }
            let payload = resolve_path(&snapshot, &path)
                .map(peel)
                .unwrap_or(Value::Null);
            self.registry.dispatch(&path, &payload);
        }
    }

    /// Targeted nested write: stage a copy of the snapshot, assign `value`
    /// at the path's pivot, then run the notification protocol for `path`.
    pub(crate) fn set_property(&self, value: Value, path: &Path) -> ArborResult<()> {
        if path.is_root() {
            self.set_state(value, path);
            return Ok(());
        }
        let mut staged = self.current();
        assign_at_path(&mut staged, path.segments(), value, path)?;
        self.set_state(staged, path);
        Ok(())
    }
}

/// Assign a value at a path inside a staged snapshot, creating intermediate
/// objects as needed. Writing past the end of an array is an error; so is
/// indexing into a primitive.
fn assign_at_path(
    current: &mut Value,
    segments: &[Seg],
    value: Value,
    full_path: &Path,
) -> ArborResult<()> {
    match segments {
        [] => {
            *current = value;
            Ok(())
        }
        [Seg::Key(key), rest @ ..] => {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            let obj = current.as_object_mut().unwrap();
            if rest.is_empty() {
                obj.insert(key.clone(), value);
                Ok(())
            } else {
                let entry = obj.entry(key.clone()).or_insert(Value::Null);
                assign_at_path(entry, rest, value, full_path)
            }
        }
        [Seg::Index(idx), rest @ ..] => {
            // Dictionaries address numeric segments as stringified keys,
            // matching the coercion on the read side.
            if let Some(obj) = current.as_object_mut() {
                let key = idx.to_string();
                if rest.is_empty() {
                    obj.insert(key, value);
                    Ok(())
                } else {
                    let entry = obj.entry(key).or_insert(Value::Null);
                    assign_at_path(entry, rest, value, full_path)
                }
            } else if let Some(arr) = current.as_array_mut() {
                if *idx >= arr.len() {
                    return Err(ArborError::index_out_of_bounds(
                        full_path.clone(),
                        *idx,
                        arr.len(),
                    ));
                }
                if rest.is_empty() {
                    arr[*idx] = value;
                    Ok(())
                } else {
                    assign_at_path(&mut arr[*idx], rest, value, full_path)
                }
            } else {
                Err(ArborError::type_mismatch(
                    full_path.clone(),
                    "array or object",
                    value_type_name(current),
                ))
            }
        }
    }
}

/// Reactive store over a dictionary-shaped snapshot.
///
/// Cheap to clone; clones share the same snapshot and registry.
///
/// # Examples
///
/// ```
/// use arbor_state::TreeStore;
/// use serde_json::json;
///
/// let store = TreeStore::new(json!({"count": 0, "user": {"name": "John"}}));
/// store.node("user.name").set(json!("Jane")).unwrap();
/// assert_eq!(store.snapshot(), json!({"count": 0, "user": {"name": "Jane"}}));
/// ```
#[derive(Clone)]
pub struct TreeStore {
    inner: Arc<TreeInner>,
}

impl TreeStore {
    /// Create a store from a resolved initial snapshot.
    pub fn new(initial: Value) -> Self {
        Self {
            inner: Arc::new(TreeInner {
                snapshot: Mutex::new(initial),
                registry: Registry::new(),
            }),
        }
    }

    /// The current snapshot (atomic markers stripped).
    pub fn snapshot(&self) -> Value {
        peel(&self.inner.current())
    }

    /// The raw snapshot, markers included; used by the tree builder.
    pub(crate) fn raw_snapshot(&self) -> Value {
        self.inner.current()
    }

    /// The store node bound to the root path.
    pub fn root(&self) -> Node {
        Node::new(Arc::clone(&self.inner), Path::root())
    }

    /// The store node for a dot-separated path.
    pub fn node(&self, path: &str) -> Node {
        self.node_at(parse_path(path))
    }

    /// The store node for an already-parsed path.
    pub fn node_at(&self, path: Path) -> Node {
        Node::new(Arc::clone(&self.inner), path)
    }

    /// Build the mirror-shaped accessor tree over the current snapshot.
    pub fn mirror(&self) -> NodeTree {
        crate::tree::traverse(self)
    }
}

impl std::fmt::Debug for TreeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeStore").finish_non_exhaustive()
    }
}

/// A constructed store: composite for dictionary-shaped state, primitive
/// for everything else.
#[derive(Clone, Debug)]
pub enum Store {
    /// Path-indexed composite store.
    Tree(TreeStore),
    /// Degenerate single-value store.
    Cell(CellStore),
}

impl Store {
    /// Resolve a lazy initializer and dispatch on the resulting shape.
    pub fn from_fn(init: impl FnOnce() -> Value) -> Self {
        create_store(init())
    }

    /// The current state (markers stripped).
    pub fn get(&self) -> Value {
        match self {
            Store::Tree(store) => store.snapshot(),
            Store::Cell(store) => store.get(),
        }
    }

    /// Replace or merge the whole state, per the coarse combine policy for
    /// composite stores and wholesale replacement for primitive ones.
    pub fn set(&self, value: Value) -> ArborResult<()> {
        match self {
            Store::Tree(store) => store.root().set(value),
            Store::Cell(store) => {
                store.set(value);
                Ok(())
            }
        }
    }

    /// Compute the next state from the current one.
    pub fn update(&self, f: impl FnOnce(&Value) -> Value) -> ArborResult<()> {
        match self {
            Store::Tree(store) => store.root().update(f),
            Store::Cell(store) => {
                store.update(f);
                Ok(())
            }
        }
    }

    /// Observe the whole state.
    pub fn subscribe(
        &self,
        subscriber: impl Fn(&Value) + Send + Sync + 'static,
        immediate: bool,
    ) -> Subscription {
        match self {
            Store::Tree(store) => store.root().subscribe(subscriber, immediate),
            Store::Cell(store) => store.subscribe(subscriber, immediate),
        }
    }

    /// The composite store, if the state was dictionary-shaped.
    pub fn as_tree(&self) -> Option<&TreeStore> {
        match self {
            Store::Tree(store) => Some(store),
            Store::Cell(_) => None,
        }
    }

    /// The primitive store, if the state was not dictionary-shaped.
    pub fn as_cell(&self) -> Option<&CellStore> {
        match self {
            Store::Cell(store) => Some(store),
            Store::Tree(_) => None,
        }
    }
}

/// Construction dispatcher: classify the resolved initial value and build
/// the matching engine. Plain dictionaries get the composite store; atomic
/// dictionaries, arrays and primitives get the primitive store.
pub fn create_store(initial: Value) -> Store {
    match classify(&initial) {
        Shape::Dictionary => Store::Tree(TreeStore::new(initial)),
        _ => Store::Cell(CellStore::new(initial)),
    }
}
