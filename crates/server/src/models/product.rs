//! Catalog product domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use trailforge_core::{Price, ProductId, ProductTags};

/// A catalog product (domain type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Catalog price.
    pub price: Price,
    /// Public URL of the product image.
    pub image_url: String,
    /// Category keys, in the order they were assigned.
    pub categories: Vec<String>,
    /// Subcategory keys; each belongs to one of `categories`.
    pub sub_categories: Vec<String>,
    /// Whether the product is highlighted on the home page.
    pub featured: bool,
    /// Display rank, ascending.
    pub order: i32,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Every writable product field, already validated.
///
/// Used for both inserts and full updates; the service merges partial
/// updates into a draft before handing it to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: String,
    pub tags: ProductTags,
    pub featured: bool,
    pub order: i32,
}

/// Catalog listing filter. Empty filter lists everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Only products tagged with this category key.
    pub category: Option<String>,
    /// Only products tagged with this subcategory key.
    pub sub_category: Option<String>,
    /// Only featured (or only non-featured) products.
    pub featured: Option<bool>,
}

impl ProductFilter {
    /// Whether `product` passes the filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.category
            .as_ref()
            .is_none_or(|key| product.categories.contains(key))
            && self
                .sub_category
                .as_ref()
                .is_none_or(|key| product.sub_categories.contains(key))
            && self.featured.is_none_or(|featured| product.featured == featured)
    }
}
