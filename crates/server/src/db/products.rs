//! Product repository for database operations.
//!
//! Queries are built at runtime with `sqlx::query_as`, so the crate compiles
//! without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use trailforge_core::{Price, ProductId};

use super::{ProductStore, RepositoryError};
use crate::models::{Product, ProductDraft, ProductFilter};

const PRODUCT_COLUMNS: &str = "id, name, description, price, image_url, categories, \
                               sub_categories, featured, sort_order, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    image_url: String,
    categories: Vec<String>,
    sub_categories: Vec<String>,
    featured: bool,
    sort_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price,
            image_url: row.image_url,
            categories: row.categories,
            sub_categories: row.sub_categories,
            featured: row.featured,
            order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE ($1::text IS NULL OR $1 = ANY(categories))
               AND ($2::text IS NULL OR $2 = ANY(sub_categories))
               AND ($3::boolean IS NULL OR featured = $3)
             ORDER BY sort_order, created_at, id"
        );

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(filter.category.as_deref())
            .bind(filter.sub_category.as_deref())
            .bind(filter.featured)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn max_order(&self) -> Result<Option<i32>, RepositoryError> {
        let max = sqlx::query_scalar::<_, Option<i32>>("SELECT MAX(sort_order) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(max)
    }

    async fn counts(&self) -> Result<(i64, i64), RepositoryError> {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE featured) FROM products",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }

    async fn insert(&self, draft: &ProductDraft) -> Result<Product, RepositoryError> {
        let sql = format!(
            "INSERT INTO products
                 (id, name, description, price, image_url, categories, sub_categories,
                  featured, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {PRODUCT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(ProductId::generate())
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.price.amount())
            .bind(&draft.image_url)
            .bind(draft.tags.categories())
            .bind(draft.tags.sub_categories())
            .bind(draft.featured)
            .bind(draft.order)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            "UPDATE products
             SET name = $2, description = $3, price = $4, image_url = $5,
                 categories = $6, sub_categories = $7, featured = $8, sort_order = $9,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.price.amount())
            .bind(&draft.image_url)
            .bind(draft.tags.categories())
            .bind(draft.tags.sub_categories())
            .bind(draft.featured)
            .bind(draft.order)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("DELETE FROM products WHERE id = $1 RETURNING {PRODUCT_COLUMNS}");

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn reorder(&self, positions: &[(ProductId, i32)]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for (id, order) in positions {
            let result = sqlx::query(
                "UPDATE products SET sort_order = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(order)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Dropping the transaction rolls back earlier updates.
                return Err(RepositoryError::NotFound);
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
