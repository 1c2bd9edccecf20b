//! Property tests for the store engine.
//!
//! These tests verify:
//! 1. Round-trip: a written value reads back per the merge policy
//! 2. Merge-vs-replace discrimination at the root and beneath it
//! 3. Atomic opacity: marked values replace wholesale
//! 4. Node identity stability across access routes
//! 5. Snapshot immutability: old snapshots are never mutated in place

use arbor_state::{atom, combine, create_store, Store, TreeStore, Value};
use serde_json::json;

// ============================================================================
// Round-trip
// ============================================================================

#[test]
fn test_round_trip_leaf_write() {
    let store = TreeStore::new(json!({"user": {"profile": {"name": "John"}}}));

    store.node("user.profile.name").set(json!("Jane")).unwrap();

    assert_eq!(store.node("user.profile.name").get(), json!("Jane"));
    assert_eq!(
        store.snapshot(),
        json!({"user": {"profile": {"name": "Jane"}}})
    );
}

#[test]
fn test_round_trip_dictionary_write_merges() {
    let store = TreeStore::new(json!({"user": {"name": "John", "age": 30}}));

    store.node("user").set(json!({"name": "Jane"})).unwrap();

    // Dictionary writes are partial updates: untouched keys survive.
    assert_eq!(store.node("user").get(), json!({"name": "Jane", "age": 30}));
}

#[test]
fn test_round_trip_array_write_replaces() {
    let store = TreeStore::new(json!({"items": [1, 2, 3]}));

    store.node("items").set(json!([9])).unwrap();

    assert_eq!(store.node("items").get(), json!([9]));
}

#[test]
fn test_write_to_absent_path_creates_intermediates() {
    let store = TreeStore::new(json!({}));

    store.node("a.b.c").set(json!(1)).unwrap();

    assert_eq!(store.snapshot(), json!({"a": {"b": {"c": 1}}}));
}

#[test]
fn test_numeric_dictionary_keys_round_trip() {
    let store = TreeStore::new(json!({"users": {"0": {"name": "x"}}}));

    // Numeric segments address dictionary keys, not just array slots.
    assert_eq!(store.node("users.0.name").get(), json!("x"));

    store.node("users.0.name").set(json!("y")).unwrap();
    assert_eq!(store.snapshot(), json!({"users": {"0": {"name": "y"}}}));
}

#[test]
fn test_array_index_out_of_bounds_is_error() {
    let store = TreeStore::new(json!({"items": [1]}));
    assert!(store.node("items.5").set(json!(2)).is_err());
    // The snapshot is untouched by the failed write.
    assert_eq!(store.snapshot(), json!({"items": [1]}));
}

// ============================================================================
// Merge vs replace
// ============================================================================

#[test]
fn test_combine_slice_is_merged() {
    assert_eq!(
        combine(&json!({"a": 1, "b": 2}), &json!({"b": 3})),
        json!({"a": 1, "b": 3})
    );
}

#[test]
fn test_combine_non_slice_is_returned_verbatim() {
    assert_eq!(
        combine(&json!({"a": 1, "b": 2}), &json!({"c": 3})),
        json!({"c": 3})
    );
}

#[test]
fn test_root_set_follows_combine_policy() {
    let store = TreeStore::new(json!({"a": 1, "b": 2}));

    store.root().set(json!({"b": 3})).unwrap();
    assert_eq!(store.snapshot(), json!({"a": 1, "b": 3}));

    store.root().set(json!({"c": 4})).unwrap();
    assert_eq!(store.snapshot(), json!({"c": 4}));
}

// ============================================================================
// Atomic opacity
// ============================================================================

#[test]
fn test_atomic_value_replaced_in_full() {
    let store = TreeStore::new(json!({
        "prefs": atom(json!({"language": "en", "theme": "dark"})),
    }));

    store.node("prefs").set(json!({"theme": "light"})).unwrap();

    // language dropped: full replace, not merge.
    assert_eq!(store.node("prefs").get(), json!({"theme": "light"}));
}

#[test]
fn test_atomic_marker_never_observable() {
    let store = TreeStore::new(json!({
        "prefs": atom(json!({"theme": "dark"})),
    }));

    assert_eq!(store.node("prefs").get(), json!({"theme": "dark"}));
    assert_eq!(store.node("prefs").keys(), vec!["theme"]);
    assert_eq!(store.snapshot(), json!({"prefs": {"theme": "dark"}}));
    // Serializing a read never leaks the marker.
    let text = serde_json::to_string(&store.snapshot()).unwrap();
    assert!(!text.contains("arbor_atom"));
}

#[test]
fn test_plain_sibling_of_atomic_still_merges() {
    let store = TreeStore::new(json!({
        "prefs": atom(json!({"theme": "dark"})),
        "user": {"name": "John", "age": 30},
    }));

    store.node("user").set(json!({"name": "Jane"})).unwrap();

    assert_eq!(store.node("user").get(), json!({"name": "Jane", "age": 30}));
    assert_eq!(store.node("prefs").get(), json!({"theme": "dark"}));
}

// ============================================================================
// Node identity
// ============================================================================

#[test]
fn test_node_identity_across_routes() {
    let store = TreeStore::new(json!({"a": {"b": {"c": 1}}}));

    assert_eq!(store.node("a.b.c"), store.root().key("a").key("b").key("c"));
    assert_eq!(store.node("a.b.c"), store.node("a.b").key("c"));
    assert_eq!(
        *store.mirror().at("a.b").unwrap().node(),
        store.node("a.b")
    );
}

// ============================================================================
// Snapshot discipline
// ============================================================================

#[test]
fn test_old_snapshots_are_not_mutated() {
    let store = TreeStore::new(json!({"count": 0}));
    let before = store.snapshot();

    store.node("count").set(json!(1)).unwrap();

    assert_eq!(before, json!({"count": 0}));
    assert_eq!(store.snapshot(), json!({"count": 1}));
}

// ============================================================================
// Construction dispatch
// ============================================================================

#[test]
fn test_primitive_root_gets_cell_store() {
    let store = create_store(json!(41));
    assert!(matches!(store, Store::Cell(_)));

    store.update(|v| json!(v.as_i64().unwrap() + 1)).unwrap();
    assert_eq!(store.get(), json!(42));
}

#[test]
fn test_dictionary_root_gets_tree_store() {
    let store = create_store(json!({"count": 0}));
    let tree = store.as_tree().expect("dictionary state is composite");

    tree.node("count").set(json!(5)).unwrap();
    assert_eq!(store.get(), json!({"count": 5}));
}

#[test]
fn test_cell_store_set_replaces_wholesale() {
    let store = create_store(json!([1, 2, 3]));
    store.set(json!({"now": "an object"})).unwrap();
    assert_eq!(store.get(), json!({"now": "an object"}));
}

#[test]
fn test_null_reads_for_absent_paths() {
    let store = TreeStore::new(json!({"a": 1}));
    assert_eq!(store.node("missing").get(), Value::Null);
    assert_eq!(store.node("a.b.c").get(), Value::Null);
}
