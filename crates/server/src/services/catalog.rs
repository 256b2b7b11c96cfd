//! Catalog service.
//!
//! Owns the product rules: required fields on create, taxonomy validation
//! against the merged result on update, order assignment, atomic batched
//! reordering and cleanup of images that are no longer referenced.

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use trailforge_core::{Price, ProductId, ProductTags, taxonomy};

use super::{ServiceError, non_blank};
use crate::db::{ProductStore, RepositoryError};
use crate::models::{Product, ProductDraft, ProductFilter};
use crate::storage::{ObjectStore, spawn_cleanup};

const PRODUCT_NOT_FOUND: &str = "Product not found";

/// Product fields as sent by clients. Every field is optional here; create
/// and update apply their own rules.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub categories: Option<Vec<String>>,
    pub sub_categories: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub order: Option<i32>,
}

impl ProductInput {
    /// Check that this input would create a valid product.
    ///
    /// Runs every check `create` does that needs no store.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` describing the first problem.
    pub fn validate_new(&self) -> Result<(), ServiceError> {
        self.clone().into_new_draft().map(|_| ())
    }

    /// Draft for a new product; order defaults to 0 when not supplied.
    fn into_new_draft(self) -> Result<ProductDraft, ServiceError> {
        let (Some(name), Some(description), Some(price), Some(image_url)) = (
            non_blank(self.name),
            non_blank(self.description),
            self.price,
            non_blank(self.image_url),
        ) else {
            return Err(ServiceError::validation("Missing required fields"));
        };

        let tags = ProductTags::new(
            self.categories.unwrap_or_default(),
            self.sub_categories.unwrap_or_default(),
        )?;

        Ok(ProductDraft {
            name,
            description,
            price: positive_price(price)?,
            image_url,
            tags,
            featured: self.featured.unwrap_or(false),
            order: self.order.map(check_order).transpose()?.unwrap_or(0),
        })
    }
}

/// One entry of a reorder batch.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReorderItem {
    pub id: ProductId,
    pub order: i32,
}

/// Catalog service.
pub struct CatalogService<'a> {
    products: &'a dyn ProductStore,
    images: &'a Arc<dyn ObjectStore>,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub fn new(products: &'a dyn ProductStore, images: &'a Arc<dyn ObjectStore>) -> Self {
        Self { products, images }
    }

    /// List products in display order.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for filter keys outside the taxonomy.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ServiceError> {
        if let Some(key) = &filter.category {
            taxonomy::check_category(key)?;
        }
        if let Some(key) = &filter.sub_category {
            taxonomy::check_sub_category(key)?;
        }
        Ok(self.products.list(filter).await?)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the product does not exist.
    pub async fn get(&self, id: ProductId) -> Result<Product, ServiceError> {
        self.products
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound(PRODUCT_NOT_FOUND))
    }

    /// Create a product.
    ///
    /// Name, description, a positive price and an image URL are required.
    /// Without an explicit order the product goes after every existing one.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for missing fields or invalid tags.
    #[instrument(skip(self, input), fields(name = ?input.name))]
    pub async fn create(&self, input: ProductInput) -> Result<Product, ServiceError> {
        let explicit_order = input.order.is_some();
        let mut draft = input.into_new_draft()?;

        if !explicit_order {
            draft.order = self
                .products
                .max_order()
                .await?
                .map_or(0, |max| max.saturating_add(1));
        }

        let product = self.products.insert(&draft).await?;
        tracing::info!(product_id = %product.id, order = product.order, "Product created");
        Ok(product)
    }

    /// Update the fields present in `input`, leaving the rest unchanged.
    ///
    /// Category rules are checked against the merged tags. A replaced image
    /// is deleted in the background when the store owns it.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the product does not exist and
    /// `ServiceError::Validation` for invalid fields.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update(&self, id: ProductId, input: ProductInput) -> Result<Product, ServiceError> {
        let current = self.get(id).await?;

        let tags = ProductTags::new(
            input.categories.unwrap_or_else(|| current.categories.clone()),
            input
                .sub_categories
                .unwrap_or_else(|| current.sub_categories.clone()),
        )?;

        let draft = ProductDraft {
            name: replace_text(input.name, current.name, "Name")?,
            description: replace_text(input.description, current.description, "Description")?,
            price: input
                .price
                .map_or(Ok(current.price), positive_price)?,
            image_url: replace_text(input.image_url, current.image_url.clone(), "Image URL")?,
            tags,
            featured: input.featured.unwrap_or(current.featured),
            order: input.order.map_or(Ok(current.order), check_order)?,
        };

        let product = self
            .products
            .update(id, &draft)
            .await?
            .ok_or(ServiceError::NotFound(PRODUCT_NOT_FOUND))?;

        if product.image_url != current.image_url {
            spawn_cleanup(self.images, &current.image_url);
        }

        Ok(product)
    }

    /// Delete a product and, in the background, its image.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: ProductId) -> Result<Product, ServiceError> {
        let product = self
            .products
            .delete(id)
            .await?
            .ok_or(ServiceError::NotFound(PRODUCT_NOT_FOUND))?;

        spawn_cleanup(self.images, &product.image_url);
        tracing::info!(product_id = %product.id, "Product deleted");
        Ok(product)
    }

    /// Apply a batch of `(id, order)` pairs atomically and return the new
    /// catalog order.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for duplicate ids, duplicate or
    /// negative orders, and `ServiceError::NotFound` if any id is unknown
    /// (in which case nothing is changed).
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn reorder(&self, items: &[ReorderItem]) -> Result<Vec<Product>, ServiceError> {
        let mut ids = HashSet::with_capacity(items.len());
        let mut orders = HashSet::with_capacity(items.len());

        for item in items {
            check_order(item.order)?;
            if !ids.insert(item.id) {
                return Err(ServiceError::Validation(format!(
                    "Duplicate product in reorder: {}",
                    item.id
                )));
            }
            if !orders.insert(item.order) {
                return Err(ServiceError::Validation(format!(
                    "Duplicate order in reorder: {}",
                    item.order
                )));
            }
        }

        let positions: Vec<(ProductId, i32)> =
            items.iter().map(|item| (item.id, item.order)).collect();

        match self.products.reorder(&positions).await {
            Ok(()) => {}
            Err(RepositoryError::NotFound) => {
                return Err(ServiceError::NotFound(PRODUCT_NOT_FOUND));
            }
            Err(e) => return Err(e.into()),
        }

        self.list(&ProductFilter::default()).await
    }

    /// Rewrite orders to `0..n` keeping the current display order.
    ///
    /// Returns how many products changed position value.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn normalize_order(&self) -> Result<usize, ServiceError> {
        let products = self.products.list(&ProductFilter::default()).await?;

        let mut positions = Vec::with_capacity(products.len());
        for (index, product) in products.iter().enumerate() {
            let order = i32::try_from(index)
                .map_err(|_| ServiceError::validation("Too many products to renumber"))?;
            if product.order != order {
                positions.push((product.id, order));
            }
        }

        if !positions.is_empty() {
            self.products.reorder(&positions).await?;
        }

        tracing::info!(changed = positions.len(), "Product order normalized");
        Ok(positions.len())
    }
}

/// New text for an update: absent keeps `current`, blank is rejected.
fn replace_text(
    value: Option<String>,
    current: String,
    field: &str,
) -> Result<String, ServiceError> {
    match value {
        None => Ok(current),
        Some(v) => non_blank(Some(v))
            .ok_or_else(|| ServiceError::Validation(format!("{field} cannot be empty"))),
    }
}

fn positive_price(amount: Decimal) -> Result<Price, ServiceError> {
    let price = Price::new(amount)?;
    if price.is_zero() {
        return Err(ServiceError::validation("Price must be greater than zero"));
    }
    Ok(price)
}

fn check_order(order: i32) -> Result<i32, ServiceError> {
    if order < 0 {
        return Err(ServiceError::validation("Order must not be negative"));
    }
    Ok(order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;

    use crate::db::MemoryStore;
    use crate::storage::{MemoryObjectStore, StorageError};

    use super::*;

    struct Fixture {
        store: MemoryStore,
        images: Arc<MemoryObjectStore>,
        dyn_images: Arc<dyn ObjectStore>,
    }

    impl Fixture {
        fn new() -> Self {
            let images = Arc::new(MemoryObjectStore::new());
            Self {
                store: MemoryStore::new(),
                dyn_images: images.clone(),
                images,
            }
        }

        fn service(&self) -> CatalogService<'_> {
            CatalogService::new(&self.store, &self.dyn_images)
        }
    }

    fn boot(name: &str) -> ProductInput {
        ProductInput {
            name: Some(name.to_string()),
            description: Some("Insulated, waterproof".to_string()),
            price: Some(Decimal::new(8_950, 2)),
            image_url: Some(format!("/uploads/{name}.png")),
            categories: Some(vec!["men-boots".to_string()]),
            sub_categories: Some(vec!["men-snow-boots".to_string()]),
            ..ProductInput::default()
        }
    }

    #[test]
    fn test_validate_new_without_store() {
        assert!(boot("alpine").validate_new().is_ok());

        let mut orphan = boot("alpine");
        orphan.sub_categories = Some(vec!["women-chelsea-boots".to_string()]);
        assert_eq!(
            orphan.validate_new().unwrap_err().to_string(),
            "Subcategory women-chelsea-boots does not belong to the selected categories"
        );

        let mut negative = boot("alpine");
        negative.order = Some(-1);
        assert!(negative.validate_new().is_err());
    }

    #[tokio::test]
    async fn test_create_assigns_next_order() {
        let fixture = Fixture::new();
        let service = fixture.service();

        let first = service.create(boot("alpine")).await.unwrap();
        let second = service.create(boot("summit")).await.unwrap();
        assert_eq!(first.order, 0);
        assert_eq!(second.order, 1);
    }

    #[tokio::test]
    async fn test_create_keeps_tags_unchanged() {
        let fixture = Fixture::new();
        let product = fixture.service().create(boot("alpine")).await.unwrap();
        assert_eq!(product.categories, ["men-boots"]);
        assert_eq!(product.sub_categories, ["men-snow-boots"]);
    }

    #[tokio::test]
    async fn test_create_requires_fields() {
        let fixture = Fixture::new();
        let mut input = boot("alpine");
        input.image_url = Some("   ".to_string());

        let err = fixture.service().create(input).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields");
    }

    #[tokio::test]
    async fn test_create_rejects_zero_price() {
        let fixture = Fixture::new();
        let mut input = boot("alpine");
        input.price = Some(Decimal::ZERO);

        let err = fixture.service().create(input).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_category() {
        let fixture = Fixture::new();
        let mut input = boot("alpine");
        input.categories = Some(vec!["kids-boots".to_string()]);
        input.sub_categories = None;

        let err = fixture.service().create(input).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid category: kids-boots");
    }

    #[tokio::test]
    async fn test_update_checks_merged_tags() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let product = service.create(boot("alpine")).await.unwrap();

        // Dropping the parent category would orphan men-snow-boots.
        let input = ProductInput {
            categories: Some(vec!["women-boots".to_string()]),
            ..ProductInput::default()
        };
        let err = service.update(product.id, input).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Subcategory men-snow-boots does not belong to the selected categories"
        );

        let unchanged = service.get(product.id).await.unwrap();
        assert_eq!(unchanged.categories, ["men-boots"]);
    }

    #[tokio::test]
    async fn test_update_replacing_image_deletes_owned_original() {
        let fixture = Fixture::new();
        let old_url = fixture
            .dyn_images
            .put("uploads/old.png", vec![1], "image/png")
            .await
            .unwrap();

        let service = fixture.service();
        let mut input = boot("alpine");
        input.image_url = Some(old_url.clone());
        let product = service.create(input).await.unwrap();

        let update = ProductInput {
            image_url: Some("/uploads/new.png".to_string()),
            ..ProductInput::default()
        };
        let updated = service.update(product.id, update).await.unwrap();
        assert_eq!(updated.image_url, "/uploads/new.png");
        assert_eq!(updated.name, "alpine");

        // Cleanup runs on a spawned task.
        for _ in 0..50 {
            if fixture.images.get(&old_url).await.is_none() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(fixture.images.get(&old_url).await.is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_owned_image() {
        let fixture = Fixture::new();
        let url = fixture
            .dyn_images
            .put("uploads/alpine.png", vec![7, 7], "image/png")
            .await
            .unwrap();

        let service = fixture.service();
        let mut input = boot("alpine");
        input.image_url = Some(url.clone());
        let product = service.create(input).await.unwrap();

        let deleted = service.delete(product.id).await.unwrap();
        assert_eq!(deleted.image_url, url);
        assert!(matches!(
            service.get(product.id).await,
            Err(ServiceError::NotFound(_))
        ));

        for _ in 0..50 {
            if fixture.images.is_empty().await {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(fixture.images.get(&url).await.is_none());
    }

    /// Claims every URL under its base and fails every delete.
    struct BrokenStore;

    #[async_trait]
    impl ObjectStore for BrokenStore {
        fn backend(&self) -> &'static str {
            "broken"
        }

        async fn put(
            &self,
            key: &str,
            _bytes: Vec<u8>,
            _content_type: &str,
        ) -> Result<String, StorageError> {
            Ok(format!("https://broken.test/{key}"))
        }

        async fn delete(&self, _url: &str) -> Result<(), StorageError> {
            Err(StorageError::S3("bucket unavailable".to_string()))
        }

        fn owns(&self, url: &str) -> bool {
            url.starts_with("https://broken.test/")
        }
    }

    #[tokio::test]
    async fn test_cleanup_failure_is_not_surfaced() {
        let store = MemoryStore::new();
        let images: Arc<dyn ObjectStore> = Arc::new(BrokenStore);
        let service = CatalogService::new(&store, &images);

        let mut input = boot("alpine");
        input.image_url = Some("https://broken.test/uploads/old.png".to_string());
        let product = service.create(input).await.unwrap();

        let update = ProductInput {
            image_url: Some("https://broken.test/uploads/new.png".to_string()),
            ..ProductInput::default()
        };
        let updated = service.update(product.id, update).await.unwrap();
        assert_eq!(updated.image_url, "https://broken.test/uploads/new.png");

        let deleted = service.delete(product.id).await.unwrap();
        assert_eq!(deleted.id, product.id);

        // Let the failing cleanup tasks run to completion.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(service.list(&ProductFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reorder_applies_batch() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let a = service.create(boot("a")).await.unwrap();
        let b = service.create(boot("b")).await.unwrap();
        let c = service.create(boot("c")).await.unwrap();

        let listed = service
            .reorder(&[
                ReorderItem { id: c.id, order: 0 },
                ReorderItem { id: a.id, order: 1 },
                ReorderItem { id: b.id, order: 2 },
            ])
            .await
            .unwrap();

        let names: Vec<_> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_reorder_rejects_duplicates_and_negatives() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let a = service.create(boot("a")).await.unwrap();
        let b = service.create(boot("b")).await.unwrap();

        let duplicate_order = [
            ReorderItem { id: a.id, order: 3 },
            ReorderItem { id: b.id, order: 3 },
        ];
        assert!(matches!(
            service.reorder(&duplicate_order).await,
            Err(ServiceError::Validation(_))
        ));

        let duplicate_id = [
            ReorderItem { id: a.id, order: 1 },
            ReorderItem { id: a.id, order: 2 },
        ];
        assert!(matches!(
            service.reorder(&duplicate_id).await,
            Err(ServiceError::Validation(_))
        ));

        let negative = [ReorderItem { id: a.id, order: -1 }];
        assert!(matches!(
            service.reorder(&negative).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_reorder_unknown_id_leaves_order_intact() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let a = service.create(boot("a")).await.unwrap();
        let b = service.create(boot("b")).await.unwrap();

        let err = service
            .reorder(&[
                ReorderItem { id: b.id, order: 0 },
                ReorderItem { id: ProductId::generate(), order: 1 },
                ReorderItem { id: a.id, order: 2 },
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let names: Vec<_> = service
            .list(&ProductFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[tokio::test]
    async fn test_normalize_order_makes_ranks_dense() {
        let fixture = Fixture::new();
        let service = fixture.service();
        for (name, order) in [("a", 10), ("b", 20), ("c", 35)] {
            let mut input = boot(name);
            input.order = Some(order);
            service.create(input).await.unwrap();
        }

        assert_eq!(service.normalize_order().await.unwrap(), 3);
        let orders: Vec<_> = service
            .list(&ProductFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|p| (p.name, p.order))
            .collect();
        assert_eq!(
            orders,
            [("a".to_string(), 0), ("b".to_string(), 1), ("c".to_string(), 2)]
        );
        assert_eq!(service.normalize_order().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_filters_and_validates_keys() {
        let fixture = Fixture::new();
        let service = fixture.service();
        service.create(boot("snow")).await.unwrap();
        let mut tactical = boot("patrol");
        tactical.categories = Some(vec!["tactical-boots".to_string()]);
        tactical.sub_categories = None;
        tactical.featured = Some(true);
        service.create(tactical).await.unwrap();

        let filter = ProductFilter {
            category: Some("tactical-boots".to_string()),
            ..ProductFilter::default()
        };
        let listed = service.list(&filter).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed.first().unwrap().featured);

        let bad = ProductFilter {
            sub_category: Some("flip-flops".to_string()),
            ..ProductFilter::default()
        };
        assert_eq!(
            service.list(&bad).await.unwrap_err().to_string(),
            "Invalid subcategory: flip-flops"
        );
    }
}
