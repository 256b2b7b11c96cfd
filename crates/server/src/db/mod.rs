//! Database operations for the catalog `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `products` - Catalog products with `TEXT[]` category tags
//! - `messages` - Contact form inquiries
//! - `settings` - Singleton site settings row
//! - `tower_sessions.session` - Back-office sessions (created by the session store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p trailforge-cli -- migrate
//! ```
//!
//! # Stores
//!
//! Handlers and services never talk to `PgPool` directly. They go through the
//! [`ProductStore`], [`MessageStore`] and [`SettingsStore`] traits, which have a
//! `PostgreSQL` implementation per table and an in-memory [`MemoryStore`] for
//! tests.

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod messages;
pub mod products;
pub mod settings;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use trailforge_core::{MessageId, MessageStatus, ProductId};

use crate::models::{Message, NewMessage, Product, ProductDraft, ProductFilter, SiteSettings};

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;
pub use messages::MessageRepository;
pub use products::ProductRepository;
pub use settings::SettingsRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Catalog product persistence.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Products matching `filter`, by ascending order, then creation time, then id.
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError>;

    /// A single product.
    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Highest order value in use, `None` when the catalog is empty.
    async fn max_order(&self) -> Result<Option<i32>, RepositoryError>;

    /// Number of products, and how many of them are featured.
    async fn counts(&self) -> Result<(i64, i64), RepositoryError>;

    /// Insert a new product.
    async fn insert(&self, draft: &ProductDraft) -> Result<Product, RepositoryError>;

    /// Overwrite every writable field of an existing product.
    async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Delete a product, returning what was removed.
    async fn delete(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Apply every `(id, order)` pair, or none of them.
    ///
    /// Fails with [`RepositoryError::NotFound`] if any id does not exist.
    async fn reorder(&self, positions: &[(ProductId, i32)]) -> Result<(), RepositoryError>;
}

/// Inquiry message persistence.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Store a new message with status `new`.
    async fn insert(&self, message: &NewMessage) -> Result<Message, RepositoryError>;

    /// Messages newest first, optionally only those with `status`.
    async fn list(&self, status: Option<MessageStatus>) -> Result<Vec<Message>, RepositoryError>;

    /// A single message.
    async fn get(&self, id: MessageId) -> Result<Option<Message>, RepositoryError>;

    /// Set the status of a message.
    async fn update_status(
        &self,
        id: MessageId,
        status: MessageStatus,
    ) -> Result<Option<Message>, RepositoryError>;

    /// Delete a message, returning what was removed.
    async fn delete(&self, id: MessageId) -> Result<Option<Message>, RepositoryError>;

    /// Number of messages per status. Statuses with no messages may be absent.
    async fn count_by_status(&self) -> Result<Vec<(MessageStatus, i64)>, RepositoryError>;
}

/// Singleton settings persistence.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// The settings row, created empty if it does not exist yet.
    async fn get_or_create(&self) -> Result<SiteSettings, RepositoryError>;

    /// Replace (or clear, with `None`) the hero image.
    ///
    /// Returns the previous image alongside the updated settings.
    async fn set_hero_image(
        &self,
        image: Option<&str>,
    ) -> Result<(Option<String>, SiteSettings), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
