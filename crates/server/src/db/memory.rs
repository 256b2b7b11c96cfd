//! In-memory store for tests.
//!
//! Implements every store trait over plain collections behind `tokio` locks.
//! Enabled for this crate's own tests and, through the `test-support` feature,
//! for downstream integration tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use trailforge_core::{MessageId, MessageStatus, ProductId};

use super::{MessageStore, ProductStore, RepositoryError, SettingsStore};
use crate::models::{Message, NewMessage, Product, ProductDraft, ProductFilter, SiteSettings};

/// Store backed by vectors, kept in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    products: RwLock<Vec<Product>>,
    messages: RwLock<Vec<Message>>,
    settings: RwLock<Option<SiteSettings>>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply(product: &mut Product, draft: &ProductDraft) {
    product.name.clone_from(&draft.name);
    product.description.clone_from(&draft.description);
    product.price = draft.price;
    product.image_url.clone_from(&draft.image_url);
    product.categories = draft.tags.categories().to_vec();
    product.sub_categories = draft.tags.sub_categories().to_vec();
    product.featured = draft.featured;
    product.order = draft.order;
    product.updated_at = Utc::now();
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut products: Vec<Product> = self
            .products
            .read()
            .await
            .iter()
            .filter(|product| filter.matches(product))
            .cloned()
            .collect();
        products.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(products)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self
            .products
            .read()
            .await
            .iter()
            .find(|product| product.id == id)
            .cloned())
    }

    async fn max_order(&self) -> Result<Option<i32>, RepositoryError> {
        Ok(self
            .products
            .read()
            .await
            .iter()
            .map(|product| product.order)
            .max())
    }

    async fn counts(&self) -> Result<(i64, i64), RepositoryError> {
        let products = self.products.read().await;
        let total = i64::try_from(products.len())
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        let featured = i64::try_from(products.iter().filter(|p| p.featured).count())
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        Ok((total, featured))
    }

    async fn insert(&self, draft: &ProductDraft) -> Result<Product, RepositoryError> {
        let now = Utc::now();
        let mut product = Product {
            id: ProductId::generate(),
            name: String::new(),
            description: String::new(),
            price: draft.price,
            image_url: String::new(),
            categories: Vec::new(),
            sub_categories: Vec::new(),
            featured: false,
            order: 0,
            created_at: now,
            updated_at: now,
        };
        apply(&mut product, draft);
        product.updated_at = now;

        self.products.write().await.push(product.clone());
        Ok(product)
    }

    async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut products = self.products.write().await;
        Ok(products.iter_mut().find(|p| p.id == id).map(|product| {
            apply(product, draft);
            product.clone()
        }))
    }

    async fn delete(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let mut products = self.products.write().await;
        Ok(products
            .iter()
            .position(|p| p.id == id)
            .map(|index| products.remove(index)))
    }

    async fn reorder(&self, positions: &[(ProductId, i32)]) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;

        // Check everything first so a failed batch changes nothing.
        if !positions
            .iter()
            .all(|(id, _)| products.iter().any(|p| p.id == *id))
        {
            return Err(RepositoryError::NotFound);
        }

        let now = Utc::now();
        for (id, order) in positions {
            if let Some(product) = products.iter_mut().find(|p| p.id == *id) {
                product.order = *order;
                product.updated_at = now;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn insert(&self, message: &NewMessage) -> Result<Message, RepositoryError> {
        let message = Message {
            id: MessageId::generate(),
            name: message.name.clone(),
            email: message.email.clone(),
            phone: message.phone.clone(),
            company: message.company.clone(),
            message: message.message.clone(),
            status: MessageStatus::New,
            created_at: Utc::now(),
        };
        self.messages.write().await.push(message.clone());
        Ok(message)
    }

    async fn list(&self, status: Option<MessageStatus>) -> Result<Vec<Message>, RepositoryError> {
        // Insertion order reversed is newest first, even for equal timestamps.
        Ok(self
            .messages
            .read()
            .await
            .iter()
            .rev()
            .filter(|m| status.is_none_or(|s| m.status == s))
            .cloned()
            .collect())
    }

    async fn get(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        Ok(self
            .messages
            .read()
            .await
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn update_status(
        &self,
        id: MessageId,
        status: MessageStatus,
    ) -> Result<Option<Message>, RepositoryError> {
        let mut messages = self.messages.write().await;
        Ok(messages.iter_mut().find(|m| m.id == id).map(|message| {
            message.status = status;
            message.clone()
        }))
    }

    async fn delete(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let mut messages = self.messages.write().await;
        Ok(messages
            .iter()
            .position(|m| m.id == id)
            .map(|index| messages.remove(index)))
    }

    async fn count_by_status(&self) -> Result<Vec<(MessageStatus, i64)>, RepositoryError> {
        let messages = self.messages.read().await;
        MessageStatus::ALL
            .into_iter()
            .map(|status| {
                let count = messages.iter().filter(|m| m.status == status).count();
                i64::try_from(count)
                    .map(|count| (status, count))
                    .map_err(|e| RepositoryError::DataCorruption(e.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get_or_create(&self) -> Result<SiteSettings, RepositoryError> {
        let mut settings = self.settings.write().await;
        Ok(settings.get_or_insert_with(SiteSettings::empty).clone())
    }

    async fn set_hero_image(
        &self,
        image: Option<&str>,
    ) -> Result<(Option<String>, SiteSettings), RepositoryError> {
        let mut settings = self.settings.write().await;
        let current = settings.get_or_insert_with(SiteSettings::empty);
        let previous = current.hero_background_image.take();
        current.hero_background_image = image.map(str::to_string);
        current.updated_at = Utc::now();
        Ok((previous, current.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use trailforge_core::{Email, Price, ProductTags};

    use super::*;

    fn draft(name: &str, order: i32) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            description: "Waterproof leather".to_string(),
            price: Price::new(Decimal::new(12_900, 2)).unwrap(),
            image_url: format!("/uploads/{name}.png"),
            tags: ProductTags::new(["men-boots"], ["men-hiking-boots"]).unwrap(),
            featured: false,
            order,
        }
    }

    #[tokio::test]
    async fn test_list_sorts_by_order() {
        let store = MemoryStore::new();
        ProductStore::insert(&store, &draft("b", 2)).await.unwrap();
        ProductStore::insert(&store, &draft("a", 1)).await.unwrap();

        let names: Vec<_> = ProductStore::list(&store, &ProductFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[tokio::test]
    async fn test_reorder_with_unknown_id_changes_nothing() {
        let store = MemoryStore::new();
        let a = ProductStore::insert(&store, &draft("a", 0)).await.unwrap();

        let result = store
            .reorder(&[(a.id, 5), (ProductId::generate(), 1)])
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
        assert_eq!(ProductStore::get(&store, a.id).await.unwrap().unwrap().order, 0);
    }

    #[tokio::test]
    async fn test_messages_list_newest_first_with_filter() {
        let store = MemoryStore::new();
        let new_message = |name: &str| NewMessage {
            name: name.to_string(),
            email: Email::parse("buyer@example.com").unwrap(),
            phone: None,
            company: None,
            message: "Quote for 500 pairs".to_string(),
        };
        let first = MessageStore::insert(&store, &new_message("first")).await.unwrap();
        MessageStore::insert(&store, &new_message("second")).await.unwrap();
        store
            .update_status(first.id, MessageStatus::Contacted)
            .await
            .unwrap();

        let all = MessageStore::list(&store, None).await.unwrap();
        assert_eq!(all.first().unwrap().name, "second");

        let contacted = MessageStore::list(&store, Some(MessageStatus::Contacted))
            .await
            .unwrap();
        assert_eq!(contacted.len(), 1);
        assert_eq!(contacted.first().unwrap().id, first.id);
    }

    #[tokio::test]
    async fn test_settings_created_lazily_and_previous_image_returned() {
        let store = MemoryStore::new();
        let settings = store.get_or_create().await.unwrap();
        assert_eq!(settings.id, "settings");
        assert!(settings.hero_background_image.is_none());

        store.set_hero_image(Some("/uploads/a.png")).await.unwrap();
        let (previous, settings) = store.set_hero_image(None).await.unwrap();
        assert_eq!(previous.as_deref(), Some("/uploads/a.png"));
        assert!(settings.hero_background_image.is_none());
    }
}
