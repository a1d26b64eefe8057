// Native file-backed storage: one JSON file per key

use crate::error::CoreError;
use crate::storage_trait::{StorageBackend, StorageResult};
use async_trait::async_trait;
use log::debug;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Keys become file names; anything outside `[A-Za-z0-9._-]` is replaced.
    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_dir.join(format!("{}.json", name))
    }

    async fn is_file(path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}

#[async_trait(?Send)]
impl StorageBackend for FileStorage {
    async fn save<T: Serialize>(&self, key: &str, data: &T) -> StorageResult<()> {
        let path = self.path_for(key);
        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| CoreError::Io(format!("Failed to create {:?}: {}", self.base_dir, e)))?;
        let json = serde_json::to_string_pretty(data)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| CoreError::Io(format!("Failed to write {:?}: {}", path, e)))?;
        debug!("Saved {} to {:?}", key, path);
        Ok(())
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let path = self.path_for(key);
        if !Self::is_file(&path).await {
            debug!("No stored value for {}", key);
            return Ok(None);
        }
        let json = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| CoreError::Io(format!("Failed to read {:?}: {}", path, e)))?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        if Self::is_file(&path).await {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| CoreError::Io(format!("Failed to remove {:?}: {}", path, e)))?;
            debug!("Removed {:?}", path);
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(Self::is_file(&self.path_for(key)).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProviderKind, WalletInfo};
    use crate::session::{forget, load_session, persist};
    use crate::storage_trait::keys;
    use tempfile::TempDir;

    fn wallet() -> WalletInfo {
        WalletInfo {
            address: "erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6th".to_string(),
            balance: "1000000000000000000".to_string(),
            is_connected: true,
            provider: ProviderKind::Extension,
        }
    }

    #[tokio::test]
    async fn test_session_record_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("state"));

        persist(&storage, &wallet()).await.unwrap();
        assert!(temp_dir.path().join("state/mvx-proofmind-wallet.json").exists());
        assert_eq!(load_session(&storage).await.unwrap(), Some(wallet()));

        forget(&storage).await.unwrap();
        assert!(!storage.exists(keys::WALLET_SESSION).await.unwrap());
        assert_eq!(load_session(&storage).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_missing_key_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.remove("never-written").await.unwrap();
        let loaded: Option<WalletInfo> = storage.load("never-written").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_keys_are_sanitized() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.save("../escape/attempt", &1u32).await.unwrap();
        assert!(temp_dir.path().join(".._escape_attempt.json").exists());
    }

    #[tokio::test]
    async fn test_corrupt_record_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        std::fs::write(temp_dir.path().join("mvx-proofmind-wallet.json"), "{oops").unwrap();
        assert_eq!(load_session(&storage).await.unwrap(), None);
    }
}
