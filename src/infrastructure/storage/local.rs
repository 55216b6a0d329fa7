use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::key_value_store::KeyValueStore;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

/// Key-value store keeping one `<key>.json` file per key under a base directory
#[derive(Clone, Debug)]
pub struct LocalFileStore {
    base_path: PathBuf,
}

impl LocalFileStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &std::path::Path {
        &self.base_path
    }

    /// Map a key to its file, refusing anything that could escape the base path
    fn resolve_path(&self, key: &str) -> DomainResult<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

        if !valid {
            return Err(DomainError::ValidationError(format!(
                "Invalid storage key: {:?}",
                key
            )));
        }

        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for LocalFileStore {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        let file_path = self.resolve_path(key)?;
        match fs::read_to_string(&file_path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::Internal(format!(
                "Failed to read {}: {}",
                file_path.display(),
                e
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        let file_path = self.resolve_path(key)?;

        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| DomainError::Internal(format!("Failed to create directory: {}", e)))?;

        // Write to a sibling temp file, then rename over the target
        let temp_path = file_path.with_extension("json.tmp");
        fs::write(&temp_path, value)
            .await
            .map_err(|e| DomainError::Internal(format!("Failed to write file: {}", e)))?;

        fs::rename(&temp_path, &file_path)
            .await
            .map_err(|e| DomainError::Internal(format!("Failed to replace file: {}", e)))
    }

    async fn remove(&self, key: &str) -> DomainResult<()> {
        let file_path = self.resolve_path(key)?;
        match fs::remove_file(&file_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Internal(format!("Failed to delete file: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_get_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalFileStore::new(temp_dir.path().join("state"));

        assert_eq!(store.get("krux_user").await.unwrap(), None);

        store.set("krux_user", "{\"id\":\"c1\"}").await.unwrap();
        assert_eq!(
            store.get("krux_user").await.unwrap().as_deref(),
            Some("{\"id\":\"c1\"}")
        );
        assert!(temp_dir.path().join("state/krux_user.json").exists());
        assert!(!temp_dir.path().join("state/krux_user.json.tmp").exists());

        store.remove("krux_user").await.unwrap();
        assert_eq!(store.get("krux_user").await.unwrap(), None);
        // Removing twice is fine
        store.remove("krux_user").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalFileStore::new(temp_dir.path());

        for key in ["../escape", "a/b", "", ".hidden"] {
            assert!(matches!(
                store.set(key, "x").await,
                Err(DomainError::ValidationError(_))
            ));
        }
    }
}
