//! Object storage for uploaded images.
//!
//! Every backend implements [`ObjectStore`]. A backend hands out public URLs
//! for what it stores and reports which URLs it owns, so replaced or deleted
//! images can be cleaned up without touching anything it did not create.
//!
//! # Backends
//!
//! - [`LocalDiskStore`] - files under a public directory, served at `/uploads`
//! - [`S3ObjectStore`] - S3-compatible bucket (R2, `MinIO`, AWS)
//! - [`MemoryObjectStore`] - in-memory map for tests

pub mod local;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::StorageConfig;

pub use local::LocalDiskStore;
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

/// Errors that can occur while storing or deleting objects.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// S3 request failed.
    #[error("s3 error: {0}")]
    S3(String),

    /// The key would escape the storage root.
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    /// The URL was not produced by this store.
    #[error("url is not owned by this store: {0}")]
    NotOwned(String),
}

/// A place uploaded files can be written to and removed from.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Store `bytes` under `key` and return its public URL.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str)
    -> Result<String, StorageError>;

    /// Delete the object behind a URL this store owns.
    ///
    /// Deleting an object that is already gone succeeds.
    async fn delete(&self, url: &str) -> Result<(), StorageError>;

    /// Whether `url` points at an object this store may delete.
    fn owns(&self, url: &str) -> bool;
}

/// Build the store selected by configuration.
pub async fn from_config(config: &StorageConfig) -> Arc<dyn ObjectStore> {
    match config {
        StorageConfig::Local { upload_dir } => Arc::new(LocalDiskStore::new(upload_dir.clone())),
        StorageConfig::S3(s3) => Arc::new(S3ObjectStore::connect(s3).await),
    }
}

/// Reject keys that are absolute or walk up the tree.
fn check_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || key.starts_with('/') || key.contains("..") || key.contains('\\') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Delete an image in the background if the store owns it.
///
/// Failures are logged at `warn` and never reach the caller. Returns the
/// task handle when a deletion was started.
pub fn spawn_cleanup(store: &Arc<dyn ObjectStore>, url: &str) -> Option<JoinHandle<()>> {
    if !store.owns(url) {
        tracing::debug!(url, "Skipping cleanup of foreign image");
        return None;
    }

    let store = Arc::clone(store);
    let url = url.to_string();
    Some(tokio::spawn(async move {
        match store.delete(&url).await {
            Ok(()) => tracing::info!(url, backend = store.backend(), "Deleted replaced image"),
            Err(e) => tracing::warn!(url, backend = store.backend(), error = %e, "Image cleanup failed"),
        }
    }))
}
