//! Session-related types for back-office authentication.
//!
//! Types stored in the session for authentication state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session-stored marker proving the shared password was entered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSession {
    /// When the password was accepted.
    pub logged_in_at: DateTime<Utc>,
}

impl AdminSession {
    /// Marker for a login happening now.
    #[must_use]
    pub fn now() -> Self {
        Self {
            logged_in_at: Utc::now(),
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the admin marker.
    pub const ADMIN: &str = "admin";
}
