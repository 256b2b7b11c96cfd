//! Local disk backend.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{ObjectStore, StorageError, check_key};

/// URL prefix the server mounts the public directory's `uploads/` under.
const PUBLIC_PREFIX: &str = "/uploads/";

/// Stores files under a public directory.
///
/// A key `uploads/x.png` is written to `<root>/uploads/x.png` and served as
/// `/uploads/x.png`.
#[derive(Debug, Clone)]
pub struct LocalDiskStore {
    root: PathBuf,
}

impl LocalDiskStore {
    /// Store rooted at the public directory.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Directory the server should serve at `/uploads`.
    #[must_use]
    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(Path::new(key))
    }
}

#[async_trait]
impl ObjectStore for LocalDiskStore {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        check_key(key)?;
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(format!("/{key}"))
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        if !self.owns(url) {
            return Err(StorageError::NotOwned(url.to_string()));
        }
        let key = url.trim_start_matches('/');
        check_key(key)?;

        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn owns(&self, url: &str) -> bool {
        url.starts_with(PUBLIC_PREFIX) && !url.contains("..")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path().to_path_buf());

        let url = store
            .put("uploads/boot.png", b"png".to_vec(), "image/png")
            .await
            .unwrap();
        assert_eq!(url, "/uploads/boot.png");
        assert!(dir.path().join("uploads/boot.png").exists());

        store.delete(&url).await.unwrap();
        assert!(!dir.path().join("uploads/boot.png").exists());

        // Second delete is a no-op.
        store.delete(&url).await.unwrap();
    }

    #[tokio::test]
    async fn test_refuses_traversal_and_foreign_urls() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path().to_path_buf());

        assert!(!store.owns("/uploads/../config.toml"));
        assert!(!store.owns("https://cdn.example.org/uploads/a.png"));
        assert!(matches!(
            store.delete("/uploads/../config.toml").await,
            Err(StorageError::NotOwned(_))
        ));
        assert!(matches!(
            store.put("../escape.png", Vec::new(), "image/png").await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
