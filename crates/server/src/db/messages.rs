//! Message repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use trailforge_core::{Email, MessageId, MessageStatus};

use super::{MessageStore, RepositoryError};
use crate::models::{Message, NewMessage};

const MESSAGE_COLUMNS: &str = "id, name, email, phone, company, message, status, created_at";

/// Internal row type for `PostgreSQL` message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: MessageId,
    name: String,
    email: String,
    phone: Option<String>,
    company: Option<String>,
    message: String,
    status: MessageStatus,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for Message {
    type Error = RepositoryError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            email,
            phone: row.phone,
            company: row.company,
            message: row.message,
            status: row.status,
            created_at: row.created_at,
        })
    }
}

/// Repository for inquiry message database operations.
#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn insert(&self, message: &NewMessage) -> Result<Message, RepositoryError> {
        let sql = format!(
            "INSERT INTO messages (id, name, email, phone, company, message, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {MESSAGE_COLUMNS}"
        );

        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(MessageId::generate())
            .bind(&message.name)
            .bind(message.email.as_str())
            .bind(message.phone.as_deref())
            .bind(message.company.as_deref())
            .bind(&message.message)
            .bind(MessageStatus::New)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn list(&self, status: Option<MessageStatus>) -> Result<Vec<Message>, RepositoryError> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE ($1::message_status IS NULL OR status = $1)
             ORDER BY created_at DESC, id DESC"
        );

        let rows = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1");

        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn update_status(
        &self,
        id: MessageId,
        status: MessageStatus,
    ) -> Result<Option<Message>, RepositoryError> {
        let sql = format!(
            "UPDATE messages SET status = $2 WHERE id = $1 RETURNING {MESSAGE_COLUMNS}"
        );

        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let sql = format!("DELETE FROM messages WHERE id = $1 RETURNING {MESSAGE_COLUMNS}");

        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn count_by_status(&self) -> Result<Vec<(MessageStatus, i64)>, RepositoryError> {
        let counts = sqlx::query_as::<_, (MessageStatus, i64)>(
            "SELECT status, COUNT(*) FROM messages GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}
