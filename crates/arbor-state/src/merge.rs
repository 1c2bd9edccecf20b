//! Structural merge engine: merge-vs-replace policy.
//!
//! Two tiers decide what a write means:
//!
//! - [`combine`] is the coarse policy for whole-state sets: a source that is
//!   a key-compatible slice of the target is shallow-merged, anything else
//!   replaces the state wholesale.
//! - [`replace`] is the recursive policy beneath targeted sets: plain nested
//!   dictionaries reconcile per key (PATCH semantics), while atomic-marked
//!   values, arrays and primitives replace in full (PUT semantics).
//!
//! Classification happens once per value via [`classify`] rather than
//! scattering shape checks through the algorithm branches.

use crate::atom::is_atomic;
use serde_json::{Map, Value};

/// Runtime shape of a value, computed once before merge dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// A plain key-value dictionary, eligible for per-key merging.
    Dictionary,
    /// A dictionary carrying the atomic marker: an indivisible unit.
    Atomic,
    /// A built-in reference type (arrays); never merged, always replaced.
    Reference,
    /// Null, booleans, numbers and strings.
    Primitive,
}

/// Classify a value for merge dispatch.
#[inline]
pub fn classify(value: &Value) -> Shape {
    match value {
        Value::Object(_) if is_atomic(value) => Shape::Atomic,
        Value::Object(_) => Shape::Dictionary,
        Value::Array(_) => Shape::Reference,
        _ => Shape::Primitive,
    }
}

/// Coarse merge policy for whole-state sets.
///
/// If `source` is a key-compatible slice of `target` — both are plain
/// dictionaries and every key of `source` already exists in `target` — the
/// result is the shallow merge of the two. Otherwise `source` is returned
/// verbatim, a full replacement.
///
/// # Examples
///
/// ```
/// use arbor_state::combine;
/// use serde_json::json;
///
/// // Slice of the target: shallow merge.
/// assert_eq!(combine(&json!({"a": 1, "b": 2}), &json!({"b": 3})), json!({"a": 1, "b": 3}));
/// // Unknown key: full replacement.
/// assert_eq!(combine(&json!({"a": 1, "b": 2}), &json!({"c": 3})), json!({"c": 3}));
/// ```
pub fn combine(target: &Value, source: &Value) -> Value {
    if classify(target) != Shape::Dictionary || classify(source) != Shape::Dictionary {
        return source.clone();
    }
    let target_obj = target.as_object().unwrap();
    let source_obj = source.as_object().unwrap();

    if !source_obj.keys().all(|k| target_obj.contains_key(k)) {
        return source.clone();
    }

    let mut merged = target_obj.clone();
    for (key, value) in source_obj {
        merged.insert(key.clone(), value.clone());
    }
    Value::Object(merged)
}

/// Recursive merge policy for targeted sets.
///
/// Reference and primitive sources pass through unchanged. When either side
/// is atomic-marked, or the target is not a dictionary, `source` wins in
/// full. Two plain dictionaries reconcile per key over the union of both key
/// sets: keys unique to one side pass through, shared keys recurse.
pub fn replace(target: &Value, source: &Value) -> Value {
    match classify(source) {
        Shape::Reference | Shape::Primitive => return source.clone(),
        Shape::Atomic => return source.clone(),
        Shape::Dictionary => {}
    }
    if classify(target) != Shape::Dictionary {
        return source.clone();
    }

    let target_obj = target.as_object().unwrap();
    let source_obj = source.as_object().unwrap();

    let mut merged = Map::with_capacity(target_obj.len() + source_obj.len());
    for (key, target_value) in target_obj {
        match source_obj.get(key) {
            Some(source_value) => {
                merged.insert(key.clone(), replace(target_value, source_value));
            }
            None => {
                merged.insert(key.clone(), target_value.clone());
            }
        }
    }
    for (key, source_value) in source_obj {
        if !target_obj.contains_key(key) {
            merged.insert(key.clone(), source_value.clone());
        }
    }
    Value::Object(merged)
}
