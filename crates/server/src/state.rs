//! Application state shared across handlers.

use std::path::PathBuf;
use std::sync::Arc;

use sqlx::PgPool;

use crate::db::{
    MessageRepository, MessageStore, ProductRepository, ProductStore, SettingsRepository,
    SettingsStore,
};
use crate::services::PasswordGate;
use crate::storage::ObjectStore;

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Clone)]
struct AppStateInner {
    products: Arc<dyn ProductStore>,
    messages: Arc<dyn MessageStore>,
    settings: Arc<dyn SettingsStore>,
    images: Arc<dyn ObjectStore>,
    password: PasswordGate,
    pool: Option<PgPool>,
    uploads_dir: Option<PathBuf>,
    max_upload_bytes: usize,
}

impl AppState {
    /// State backed by `PostgreSQL` repositories.
    #[must_use]
    pub fn postgres(
        pool: PgPool,
        images: Arc<dyn ObjectStore>,
        password: PasswordGate,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                products: Arc::new(ProductRepository::new(pool.clone())),
                messages: Arc::new(MessageRepository::new(pool.clone())),
                settings: Arc::new(SettingsRepository::new(pool.clone())),
                images,
                password,
                pool: Some(pool),
                uploads_dir: None,
                max_upload_bytes,
            }),
        }
    }

    /// State backed by a single in-memory store.
    #[cfg(any(test, feature = "test-support"))]
    #[must_use]
    pub fn in_memory(
        images: Arc<dyn ObjectStore>,
        password: PasswordGate,
        max_upload_bytes: usize,
    ) -> Self {
        let store = Arc::new(crate::db::MemoryStore::new());
        Self {
            inner: Arc::new(AppStateInner {
                products: store.clone(),
                messages: store.clone(),
                settings: store,
                images,
                password,
                pool: None,
                uploads_dir: None,
                max_upload_bytes,
            }),
        }
    }

    /// Serve local uploads from `dir` under `/uploads`.
    ///
    /// Clones that already exist keep their previous setting.
    #[must_use]
    pub fn with_uploads_dir(mut self, dir: PathBuf) -> Self {
        Arc::make_mut(&mut self.inner).uploads_dir = Some(dir);
        self
    }

    pub fn products(&self) -> &dyn ProductStore {
        self.inner.products.as_ref()
    }

    pub fn messages(&self) -> &dyn MessageStore {
        self.inner.messages.as_ref()
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.inner.settings.as_ref()
    }

    pub fn images(&self) -> &Arc<dyn ObjectStore> {
        &self.inner.images
    }

    pub fn password(&self) -> &PasswordGate {
        &self.inner.password
    }

    /// Database pool, absent when running on in-memory stores.
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    pub fn uploads_dir(&self) -> Option<&PathBuf> {
        self.inner.uploads_dir.as_ref()
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.inner.max_upload_bytes
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use crate::storage::MemoryObjectStore;

    use super::*;

    fn state() -> AppState {
        AppState::in_memory(
            Arc::new(MemoryObjectStore::new()),
            PasswordGate::new(&SecretString::from("Rk7!vQ2#mZp9Lw")),
            1024,
        )
    }

    #[test]
    fn test_uploads_dir_unset_by_default() {
        assert!(state().uploads_dir().is_none());
    }

    #[test]
    fn test_uploads_dir_applies_to_shared_state() {
        let original = state();
        let shared = original.clone();

        let with_dir = shared.with_uploads_dir(PathBuf::from("/srv/trailforge/uploads"));
        assert_eq!(
            with_dir.uploads_dir(),
            Some(&PathBuf::from("/srv/trailforge/uploads"))
        );
        assert!(original.uploads_dir().is_none());
        assert_eq!(with_dir.max_upload_bytes(), 1024);
    }
}
