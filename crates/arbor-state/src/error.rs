//! Error types for arbor-state operations.
//!
//! Reads are lenient and never fail (missing paths resolve to nothing);
//! errors arise only from targeted writes and serialization.

use crate::Path;
use thiserror::Error;

/// Result type alias for arbor-state operations.
pub type ArborResult<T> = Result<T, ArborError>;

/// Errors that can occur during arbor-state operations.
#[derive(Debug, Error)]
pub enum ArborError {
    /// Array index is out of bounds during a targeted write.
    #[error("index {index} out of bounds (len: {len}) at path {path}")]
    IndexOutOfBounds {
        /// The path to the array.
        path: Path,
        /// The index that was written.
        index: usize,
        /// The actual length of the array.
        len: usize,
    },

    /// A write navigated into a value of the wrong shape.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The path where the mismatch occurred.
        path: Path,
        /// The expected type.
        expected: &'static str,
        /// The actual type found.
        found: &'static str,
    },

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ArborError {
    /// Create an index out of bounds error.
    #[inline]
    pub fn index_out_of_bounds(path: Path, index: usize, len: usize) -> Self {
        ArborError::IndexOutOfBounds { path, index, len }
    }

    /// Create a type mismatch error.
    #[inline]
    pub fn type_mismatch(path: Path, expected: &'static str, found: &'static str) -> Self {
        ArborError::TypeMismatch {
            path,
            expected,
            found,
        }
    }
}

/// Get the type name of a JSON value.
#[inline]
pub fn value_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use serde_json::json;

    #[test]
    fn test_error_display() {
        let err = ArborError::index_out_of_bounds(path!("items", 9), 9, 3);
        assert!(err.to_string().contains("out of bounds"));

        let err = ArborError::type_mismatch(path!("user"), "array", "object");
        assert!(err.to_string().contains("expected array"));
    }

    #[test]
    fn test_value_type_name() {
        assert_eq!(value_type_name(&json!(null)), "null");
        assert_eq!(value_type_name(&json!(1.5)), "number");
        assert_eq!(value_type_name(&json!([])), "array");
        assert_eq!(value_type_name(&json!({})), "object");
    }
}
