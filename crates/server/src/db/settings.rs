//! Settings database operations.
//!
//! The table holds at most one row, keyed by [`SETTINGS_ID`]. Reads create it
//! on demand.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};

use super::{RepositoryError, SettingsStore};
use crate::models::{SETTINGS_ID, SiteSettings};

/// Internal row type for `PostgreSQL` settings queries.
#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    id: String,
    hero_background_image: Option<String>,
    updated_at: DateTime<Utc>,
}

impl From<SettingsRow> for SiteSettings {
    fn from(row: SettingsRow) -> Self {
        Self {
            id: row.id,
            hero_background_image: row.hero_background_image,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for the settings row.
#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Insert the settings row if it is missing.
async fn ensure_row<'e, E>(executor: E) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query("INSERT INTO settings (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
        .bind(SETTINGS_ID)
        .execute(executor)
        .await?;
    Ok(())
}

#[async_trait]
impl SettingsStore for SettingsRepository {
    async fn get_or_create(&self) -> Result<SiteSettings, RepositoryError> {
        ensure_row(&self.pool).await?;

        let row = sqlx::query_as::<_, SettingsRow>(
            "SELECT id, hero_background_image, updated_at FROM settings WHERE id = $1",
        )
        .bind(SETTINGS_ID)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn set_hero_image(
        &self,
        image: Option<&str>,
    ) -> Result<(Option<String>, SiteSettings), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        ensure_row(&mut *tx).await?;

        let previous = sqlx::query_scalar::<_, Option<String>>(
            "SELECT hero_background_image FROM settings WHERE id = $1 FOR UPDATE",
        )
        .bind(SETTINGS_ID)
        .fetch_one(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, SettingsRow>(
            "UPDATE settings SET hero_background_image = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING id, hero_background_image, updated_at",
        )
        .bind(SETTINGS_ID)
        .bind(image)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((previous, row.into()))
    }
}
