//! CLI command implementations.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string (all commands)
//! - `STORAGE_BACKEND` and friends - object storage, for commands that go
//!   through the catalog service

pub mod migrate;
pub mod products;
pub mod seed;

use std::sync::Arc;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use trailforge_server::config::{ConfigError, StorageConfig};
use trailforge_server::db;
use trailforge_server::services::ServiceError;
use trailforge_server::storage::{self, ObjectStore};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Seed file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// Seed file is not valid YAML for a product list.
    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Seed file contents were rejected.
    #[error("{count} product(s) failed validation")]
    Invalid { count: usize },

    /// Catalog operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Connect to the database named by `DATABASE_URL`.
async fn connect() -> Result<PgPool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}

/// Object store selected by the environment.
async fn object_store() -> Result<Arc<dyn ObjectStore>, CliError> {
    let config = StorageConfig::from_env()?;
    Ok(storage::from_config(&config).await)
}
