//! Storage adapter contract.
//!
//! An adapter owns a keyed value store with async I/O. Failures propagate as
//! errors to the caller; the state engine neither swallows nor retries them —
//! retry and backoff policy, if any, belongs to the adapter itself.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors from storage adapter operations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Underlying I/O failure.
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored payload could not be parsed.
    #[error("stored value is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific failure.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Key rejected by the adapter (e.g. unsafe as a filename).
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Async keyed storage for store snapshots.
///
/// The transform hooks let an adapter persist a different representation
/// than the live state (e.g. dropping transient fields on the way out and
/// restoring defaults on the way in); both default to identity.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Read the stored value for a key; `None` when the key is absent.
    async fn get_item(&self, key: &str) -> Result<Option<Value>, AdapterError>;

    /// Write the value for a key, replacing any previous one.
    async fn set_item(&self, key: &str, value: Value) -> Result<(), AdapterError>;

    /// Delete the value for a key; absent keys are a no-op.
    async fn remove_item(&self, key: &str) -> Result<(), AdapterError>;

    /// Map live state to its stored representation.
    fn storage_transform(&self, value: Value) -> Value {
        value
    }

    /// Map a stored representation back to live state.
    fn usage_transform(&self, stored: Value) -> Value {
        stored
    }
}
