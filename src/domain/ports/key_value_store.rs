use crate::domain::errors::DomainResult;
use async_trait::async_trait;

/// Blob storage addressed by key, one serialized document per key
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the blob stored under `key`, `None` if nothing was ever written
    async fn get(&self, key: &str) -> DomainResult<Option<String>>;

    /// Replace the blob stored under `key`
    async fn set(&self, key: &str, value: &str) -> DomainResult<()>;

    /// Drop the blob stored under `key`; removing a missing key is not an error
    async fn remove(&self, key: &str) -> DomainResult<()>;
}
