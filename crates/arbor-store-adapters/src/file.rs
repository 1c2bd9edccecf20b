use crate::contract::{AdapterError, StorageAdapter};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;

/// File-backed storage: one JSON file per key under a base directory.
pub struct FileAdapter {
    base_path: PathBuf,
}

impl FileAdapter {
    /// Create a file storage rooted at the given directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn item_path(&self, key: &str) -> Result<PathBuf, AdapterError> {
        Self::validate_key(key)?;
        Ok(self.base_path.join(format!("{key}.json")))
    }

    /// Validate that a key is safe for use as a filename.
    /// Rejects path separators, `..`, and control characters.
    fn validate_key(key: &str) -> Result<(), AdapterError> {
        if key.is_empty() {
            return Err(AdapterError::InvalidKey("key cannot be empty".to_string()));
        }
        if key.contains('/') || key.contains('\\') || key.contains("..") || key.contains('\0') {
            return Err(AdapterError::InvalidKey(format!(
                "key contains invalid characters: {key:?}"
            )));
        }
        if key.chars().any(|c| c.is_control()) {
            return Err(AdapterError::InvalidKey(format!(
                "key contains control characters: {key:?}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for FileAdapter {
    async fn get_item(&self, key: &str) -> Result<Option<Value>, AdapterError> {
        let path = self.item_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set_item(&self, key: &str, value: Value) -> Result<(), AdapterError> {
        let path = self.item_path(key)?;
        tokio::fs::create_dir_all(&self.base_path).await?;
        let bytes = serde_json::to_vec_pretty(&value)?;
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), AdapterError> {
        let path = self.item_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
