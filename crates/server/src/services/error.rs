//! Service-layer error type.

use thiserror::Error;

use trailforge_core::{EmailError, InvalidStatus, PriceError, TaxonomyError};

use crate::db::RepositoryError;
use crate::storage::StorageError;

/// Errors returned by the business logic services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed validation; the message is shown to the client.
    #[error("{0}")]
    Validation(String),

    /// The referenced record does not exist.
    #[error("{0}")]
    NotFound(&'static str),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Object storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ServiceError {
    /// Validation error with a message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<TaxonomyError> for ServiceError {
    fn from(e: TaxonomyError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<EmailError> for ServiceError {
    fn from(e: EmailError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<InvalidStatus> for ServiceError {
    fn from(e: InvalidStatus) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<PriceError> for ServiceError {
    fn from(e: PriceError) -> Self {
        Self::Validation(format!("Invalid price: {e}"))
    }
}
