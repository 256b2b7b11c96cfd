//! Inbox service for contact form messages.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use trailforge_core::{Email, EmailError, MessageId, MessageStatus};

use super::{ServiceError, non_blank};
use crate::db::MessageStore;
use crate::models::{Message, NewMessage};

const MESSAGE_NOT_FOUND: &str = "Message not found";

/// Contact form submission as sent by the public site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
}

/// Message totals for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub new: i64,
    pub contacted: i64,
    pub completed: i64,
    pub total: i64,
}

/// Inbox service.
pub struct InboxService<'a> {
    messages: &'a dyn MessageStore,
}

impl<'a> InboxService<'a> {
    /// Create a new inbox service.
    #[must_use]
    pub fn new(messages: &'a dyn MessageStore) -> Self {
        Self { messages }
    }

    /// Accept a contact form submission.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if name, email or message is
    /// missing, or the email is malformed.
    #[instrument(skip(self, input))]
    pub async fn submit(&self, input: MessageInput) -> Result<Message, ServiceError> {
        let (Some(name), Some(email), Some(message)) = (
            non_blank(input.name),
            non_blank(input.email),
            non_blank(input.message),
        ) else {
            return Err(ServiceError::validation(
                "Name, email and message are required",
            ));
        };

        let email = Email::parse(&email).map_err(|e| match e {
            EmailError::TooLong { .. } => ServiceError::from(e),
            _ => ServiceError::from(EmailError::InvalidFormat),
        })?;

        let new_message = NewMessage {
            name,
            email,
            phone: non_blank(input.phone),
            company: non_blank(input.company),
            message,
        };

        let message = self.messages.insert(&new_message).await?;
        tracing::info!(message_id = %message.id, domain = message.email.domain(), "Message received");
        Ok(message)
    }

    /// Messages newest first, optionally filtered by a status name.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an unknown status.
    pub async fn list(&self, status: Option<&str>) -> Result<Vec<Message>, ServiceError> {
        let status = status.map(str::parse::<MessageStatus>).transpose()?;
        Ok(self.messages.list(status).await?)
    }

    /// Move a message to `status`.
    ///
    /// Any of the three statuses may be set directly; other values leave the
    /// stored status untouched.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an unknown status and
    /// `ServiceError::NotFound` if the message does not exist.
    #[instrument(skip(self), fields(message_id = %id))]
    pub async fn update_status(&self, id: MessageId, status: &str) -> Result<Message, ServiceError> {
        let status: MessageStatus = status.parse()?;
        self.messages
            .update_status(id, status)
            .await?
            .ok_or(ServiceError::NotFound(MESSAGE_NOT_FOUND))
    }

    /// Delete a message.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the message does not exist.
    #[instrument(skip(self), fields(message_id = %id))]
    pub async fn delete(&self, id: MessageId) -> Result<Message, ServiceError> {
        self.messages
            .delete(id)
            .await?
            .ok_or(ServiceError::NotFound(MESSAGE_NOT_FOUND))
    }

    /// Count messages per status.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn status_counts(&self) -> Result<StatusCounts, ServiceError> {
        let mut counts = StatusCounts::default();
        for (status, count) in self.messages.count_by_status().await? {
            match status {
                MessageStatus::New => counts.new += count,
                MessageStatus::Contacted => counts.contacted += count,
                MessageStatus::Completed => counts.completed += count,
            }
            counts.total += count;
        }
        Ok(counts)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::db::MemoryStore;

    use super::*;

    fn input(email: &str) -> MessageInput {
        MessageInput {
            name: Some("Dana".to_string()),
            email: Some(email.to_string()),
            phone: Some("  ".to_string()),
            company: Some("Northwind Outfitters".to_string()),
            message: Some("Do you ship to Norway?".to_string()),
        }
    }

    #[tokio::test]
    async fn test_submit_stores_new_message() {
        let store = MemoryStore::new();
        let inbox = InboxService::new(&store);

        let message = inbox.submit(input("dana@northwind.example")).await.unwrap();
        assert_eq!(message.status, MessageStatus::New);
        assert_eq!(message.phone, None);
        assert_eq!(message.company.as_deref(), Some("Northwind Outfitters"));
    }

    #[tokio::test]
    async fn test_submit_requires_fields() {
        let store = MemoryStore::new();
        let inbox = InboxService::new(&store);

        let mut missing = input("dana@northwind.example");
        missing.message = None;
        let err = inbox.submit(missing).await.unwrap_err();
        assert_eq!(err.to_string(), "Name, email and message are required");
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_email() {
        let store = MemoryStore::new();
        let inbox = InboxService::new(&store);

        let err = inbox.submit(input("dana@localhost")).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email format");
        assert!(inbox.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_status_keeps_stored_status() {
        let store = MemoryStore::new();
        let inbox = InboxService::new(&store);
        let message = inbox.submit(input("dana@northwind.example")).await.unwrap();

        inbox.update_status(message.id, "contacted").await.unwrap();
        let err = inbox.update_status(message.id, "archived").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid status");

        let stored = inbox.list(None).await.unwrap();
        assert_eq!(stored.first().unwrap().status, MessageStatus::Contacted);
    }

    #[tokio::test]
    async fn test_completed_can_be_reset_to_new() {
        let store = MemoryStore::new();
        let inbox = InboxService::new(&store);
        let message = inbox.submit(input("dana@northwind.example")).await.unwrap();

        inbox.update_status(message.id, "completed").await.unwrap();
        let reset = inbox.update_status(message.id, "new").await.unwrap();
        assert_eq!(reset.status, MessageStatus::New);
    }

    #[tokio::test]
    async fn test_status_counts() {
        let store = MemoryStore::new();
        let inbox = InboxService::new(&store);
        let a = inbox.submit(input("a@northwind.example")).await.unwrap();
        inbox.submit(input("b@northwind.example")).await.unwrap();
        inbox.update_status(a.id, "completed").await.unwrap();

        let counts = inbox.status_counts().await.unwrap();
        assert_eq!(
            counts,
            StatusCounts {
                new: 1,
                contacted: 0,
                completed: 1,
                total: 2
            }
        );
    }

    #[tokio::test]
    async fn test_delete_unknown_message() {
        let store = MemoryStore::new();
        let inbox = InboxService::new(&store);
        let err = inbox.delete(MessageId::generate()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
