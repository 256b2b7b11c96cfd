//! In-memory backend for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ObjectStore, StorageError, check_key};

const BASE_URL: &str = "https://objects.test";

/// Keeps objects in a map keyed by URL.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryObjectStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes and content type stored at `url`.
    pub async fn get(&self, url: &str) -> Option<(Vec<u8>, String)> {
        self.objects.lock().await.get(url).cloned()
    }

    /// Whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.objects.lock().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        check_key(key)?;
        let url = format!("{BASE_URL}/{key}");
        self.objects
            .lock()
            .await
            .insert(url.clone(), (bytes, content_type.to_string()));
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        if !self.owns(url) {
            return Err(StorageError::NotOwned(url.to_string()));
        }
        self.objects.lock().await.remove(url);
        Ok(())
    }

    fn owns(&self, url: &str) -> bool {
        url.strip_prefix(BASE_URL)
            .is_some_and(|rest| rest.starts_with('/') && !rest.contains(".."))
    }
}
