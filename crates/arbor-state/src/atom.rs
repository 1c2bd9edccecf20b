//! Atomic marking for opaque value objects.
//!
//! A dictionary marked with [`atom`] is treated by the merge engine as an
//! indivisible unit: writes replace it wholesale instead of merging per key,
//! and the tree builder does not expand it into child nodes.
//!
//! The marker is a reserved key inserted into the object. JSON values carry
//! no out-of-band identity that would survive snapshot staging copies, so an
//! in-band marker is the only representation that follows a value through
//! clones. It is never observable: every value handed back to a caller is
//! [`peel`]ed first.

use serde_json::Value;

/// Reserved marker key. The leading control character keeps it out of the
/// space of keys a caller could plausibly use.
pub(crate) const ATOM_KEY: &str = "\u{1}__arbor_atom__";

/// Check whether a key is the internal atomic marker.
#[inline]
pub(crate) fn is_marker_key(key: &str) -> bool {
    key == ATOM_KEY
}

/// Mark a dictionary as atomic.
///
/// Idempotent: marking an already-marked value changes nothing. Values that
/// are not dictionaries are returned unchanged — there is nothing to merge
/// partially, so they already behave atomically.
///
/// # Examples
///
/// ```
/// use arbor_state::{atom, is_atomic};
/// use serde_json::json;
///
/// let prefs = atom(json!({"language": "en", "theme": "dark"}));
/// assert!(is_atomic(&prefs));
/// assert_eq!(atom(prefs.clone()), prefs);
/// ```
pub fn atom(mut value: Value) -> Value {
    if let Some(obj) = value.as_object_mut() {
        obj.entry(ATOM_KEY.to_owned()).or_insert(Value::Bool(true));
    }
    value
}

/// Check whether a value carries the atomic marker.
#[inline]
pub fn is_atomic(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.contains_key(ATOM_KEY))
}

/// Strip atomic markers from a value, recursively.
///
/// Applied to every value that leaves the engine (`get`, notification
/// payloads, key enumeration) so the marker never shows up in reads,
/// iteration, or serialized output.
pub fn peel(value: &Value) -> Value {
    match value {
        Value::Object(obj) => Value::Object(
            obj.iter()
                .filter(|(k, _)| !is_marker_key(k))
                .map(|(k, v)| (k.clone(), peel(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(peel).collect()),
        other => other.clone(),
    }
}
