//! Business logic services.
//!
//! Services validate input, enforce catalog rules and coordinate stores with
//! object storage. They borrow their dependencies from `AppState` and are
//! cheap to build per request.
//!
//! # Services
//!
//! - `auth` - Shared-password check for the back office
//! - `catalog` - Products, tagging, ordering and image cleanup
//! - `inbox` - Contact form messages and their status workflow
//! - `settings` - Site-wide hero image
//! - `upload` - Image upload validation and storage

pub mod auth;
pub mod catalog;
mod error;
pub mod inbox;
pub mod settings;
pub mod upload;

pub use auth::PasswordGate;
pub use catalog::{CatalogService, ProductInput, ReorderItem};
pub use error::ServiceError;
pub use inbox::{InboxService, MessageInput, StatusCounts};
pub use settings::{SettingsPatch, SettingsService};
pub use upload::{INVALID_FILE_TYPE, UploadService, UploadedFile};

/// Trimmed value, or `None` when absent or blank.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
