//! Mirror-shaped accessor tree builder.
//!
//! [`traverse`] walks a snapshot and builds a [`NodeTree`] whose shape
//! mirrors the data: one subtree per plain nested dictionary, a leaf node
//! for everything the engine treats as indivisible (primitives, arrays,
//! atomic-marked values). Each path is recorded in a `seen` set before its
//! children are expanded; JSON snapshots are acyclic by construction, so the
//! walk asserts single-visitation instead of branching on it, and the
//! observable contract is node identity stability — every route to a path
//! lands on an accessor that compares equal.

use crate::atom::is_marker_key;
use crate::merge::{classify, Shape};
use crate::node::Node;
use crate::path::seg_from_key;
use crate::store::TreeStore;
use crate::Path;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// One level of the mirror-shaped accessor tree.
#[derive(Clone, Debug)]
pub struct NodeTree {
    node: Node,
    children: BTreeMap<String, NodeTree>,
}

impl NodeTree {
    fn leaf(node: Node) -> Self {
        Self {
            node,
            children: BTreeMap::new(),
        }
    }

    /// The accessor bound to this level's path.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// The expanded child subtree for a direct key, if the key named a
    /// plain nested dictionary at build time.
    pub fn child(&self, key: &str) -> Option<&NodeTree> {
        self.children.get(key)
    }

    /// Walk a dot-separated path through the expanded subtrees.
    pub fn at(&self, path: &str) -> Option<&NodeTree> {
        let mut current = self;
        for segment in path.split('.') {
            if segment.is_empty() {
                continue;
            }
            current = current.children.get(segment)?;
        }
        Some(current)
    }

    /// Keys of the expanded children, in stable order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Whether this level was built as an unexpanded leaf.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Build the accessor tree over the store's current snapshot.
pub(crate) fn traverse(store: &TreeStore) -> NodeTree {
    let snapshot = store.raw_snapshot();
    let mut seen = HashSet::new();
    expand(store, &snapshot, Path::root(), &mut seen)
}

fn expand(store: &TreeStore, value: &Value, path: Path, seen: &mut HashSet<Path>) -> NodeTree {
    let node = store.node_at(path.clone());
    // Register before recursing. JSON snapshots are acyclic, so the walk can
    // never revisit a path; assert the invariant rather than branching on a
    // case that cannot occur.
    let _first_visit = seen.insert(path.clone());
    debug_assert!(_first_visit, "traversal revisited path {path}");

    let mut children = BTreeMap::new();
    if let Some(obj) = value.as_object() {
        if classify(value) == Shape::Dictionary {
            for (key, child) in obj {
                if is_marker_key(key) {
                    continue;
                }
                let child_path = path.child(seg_from_key(key));
                let subtree = match classify(child) {
                    Shape::Dictionary => expand(store, child, child_path, seen),
                    // Primitives, arrays and atomic values are leaves: their
                    // accessor reads the raw value, never expands further.
                    _ => NodeTree::leaf(store.node_at(child_path)),
                };
                children.insert(key.clone(), subtree);
            }
        }
    }
    NodeTree { node, children }
}
