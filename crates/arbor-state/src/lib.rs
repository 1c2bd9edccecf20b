//! Reactive hierarchical state container with path-indexed subscriptions.
//!
//! `arbor-state` turns a nested JSON value into a tree of accessors: every
//! location in the state can be read, written and observed independently,
//! with change notifications propagating to exactly the affected paths —
//! ancestors of a write, the written path itself, and the descendants of
//! the new value. Siblings are never notified.
//!
//! # Core concepts
//!
//! - **Snapshot**: the store's current value, a `serde_json::Value`. A new
//!   snapshot is produced on every write; old ones are never mutated.
//! - **Path**: a dot-delimited location inside a snapshot (`"user.name"`).
//! - **Node**: an accessor bound to one path (`get`/`set`/`update`/
//!   `subscribe`/`key`), holding no state of its own.
//! - **Atomic value**: a dictionary marked with [`atom`] that the merge
//!   engine replaces wholesale instead of merging per key.
//! - **Merge policy**: plain nested dictionaries merge per key (PATCH
//!   semantics, [`replace`]); whole-state sets merge only key-compatible
//!   slices ([`combine`]); everything else replaces.
//!
//! # Quick start
//!
//! ```
//! use arbor_state::TreeStore;
//! use serde_json::json;
//!
//! let store = TreeStore::new(json!({"count": 0, "user": {"name": "John"}}));
//!
//! // Targeted write: merges into the tree, siblings untouched.
//! store.node("user.name").set(json!("Jane")).unwrap();
//! assert_eq!(store.snapshot(), json!({"count": 0, "user": {"name": "Jane"}}));
//!
//! // Path-indexed observation.
//! let sub = store.node("user").subscribe(|v| println!("user changed: {v}"), false);
//! store.node("user.name").set(json!("Joan")).unwrap(); // fires
//! store.node("count").set(json!(1)).unwrap();          // does not fire
//! sub.unsubscribe();
//! ```
//!
//! # Atomic value objects
//!
//! ```
//! use arbor_state::{atom, TreeStore};
//! use serde_json::json;
//!
//! let store = TreeStore::new(json!({
//!     "prefs": atom(json!({"language": "en", "theme": "dark"})),
//! }));
//!
//! // Atomic values replace in full: no per-key merge.
//! store.node("prefs").set(json!({"theme": "light"})).unwrap();
//! assert_eq!(store.node("prefs").get(), json!({"theme": "light"}));
//! ```
//!
//! # Concurrency model
//!
//! Writes are fully synchronous: the snapshot swap and all notifications
//! complete before `set` returns. Subscribers may re-enter the store
//! (including calling `set`) during a notification pass; subscriber sets
//! are snapshotted per pass, so late registrations miss the in-flight
//! event and unsubscriptions take effect immediately.

mod atom;
mod cell;
mod error;
mod merge;
mod node;
mod path;
mod registry;
mod store;
mod tree;

pub use atom::{atom, is_atomic, peel};
pub use cell::CellStore;
pub use error::{value_type_name, ArborError, ArborResult};
pub use merge::{classify, combine, replace, Shape};
pub use node::{Binding, Node, Setter};
pub use path::{
    descendant_paths, parse_path, path_components, resolve_path, Path, Seg,
};
pub use registry::{Subscriber, Subscription};
pub use store::{create_store, Store, TreeStore};
pub use tree::NodeTree;

// Re-export serde_json::Value for convenience
pub use serde_json::Value;
