// WASM localStorage-backed storage

use crate::error::CoreError;
use crate::storage_trait::{StorageBackend, StorageResult};
use async_trait::async_trait;
use log::debug;
use serde::{de::DeserializeOwned, Serialize};
use web_sys::window;

pub struct LocalStorageBackend {
    prefix: String,
}

impl LocalStorageBackend {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    /// Unprefixed keys, so the session record sits at `mvx-proofmind-wallet`
    /// where the web application expects it.
    pub fn unprefixed() -> Self {
        Self::new("")
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn storage(&self) -> StorageResult<web_sys::Storage> {
        window()
            .ok_or_else(|| CoreError::Init("No window object available".to_string()))?
            .local_storage()
            .map_err(|e| CoreError::Storage(format!("Failed to access localStorage: {:?}", e)))?
            .ok_or_else(|| CoreError::Init("localStorage not available".to_string()))
    }

    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.storage()?
            .get_item(&self.full_key(key))
            .map_err(|e| CoreError::Storage(format!("Failed to read localStorage: {:?}", e)))
    }
}

#[async_trait(?Send)]
impl StorageBackend for LocalStorageBackend {
    async fn save<T: Serialize>(&self, key: &str, data: &T) -> StorageResult<()> {
        let json = serde_json::to_string(data)?;
        self.storage()?
            .set_item(&self.full_key(key), &json)
            .map_err(|e| CoreError::Storage(format!("Failed to write localStorage: {:?}", e)))?;
        debug!("Saved {} to localStorage", key);
        Ok(())
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        match self.get_item(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.storage()?
            .remove_item(&self.full_key(key))
            .map_err(|e| CoreError::Storage(format!("Failed to remove from localStorage: {:?}", e)))?;
        debug!("Removed {} from localStorage", key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get_item(key)?.is_some())
    }
}
