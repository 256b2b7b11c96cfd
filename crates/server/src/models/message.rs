//! Inquiry message domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use trailforge_core::{Email, MessageId, MessageStatus};

/// An inquiry submitted through the public contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
}

/// A validated contact form submission, ready to store.
///
/// Blank optional fields have already been collapsed to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: String,
}
