use crate::contract::{AdapterError, StorageAdapter};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory storage for testing and local development.
#[derive(Default)]
pub struct MemoryAdapter {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryAdapter {
    /// Create a new in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageAdapter for MemoryAdapter {
    async fn get_item(&self, key: &str) -> Result<Option<Value>, AdapterError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: Value) -> Result<(), AdapterError> {
        self.entries.write().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), AdapterError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
