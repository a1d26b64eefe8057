// Key/value persistence: JSON files natively, localStorage in the browser

use crate::error::CoreError;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

pub type StorageResult<T> = Result<T, CoreError>;

/// Durable storage for small JSON records such as the wallet session.
#[async_trait(?Send)]
pub trait StorageBackend {
    async fn save<T: Serialize>(&self, key: &str, data: &T) -> StorageResult<()>;

    /// `Ok(None)` when nothing is stored under `key`.
    async fn load<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>>;

    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> StorageResult<()>;

    async fn exists(&self, key: &str) -> StorageResult<bool>;
}

pub mod keys {
    /// Durable session record (`WalletInfo` JSON).
    pub const WALLET_SESSION: &str = "mvx-proofmind-wallet";
}
