//! Site settings service.

use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use tracing::instrument;

use super::ServiceError;
use crate::db::SettingsStore;
use crate::models::SiteSettings;
use crate::storage::{ObjectStore, spawn_cleanup};

/// Partial settings update.
///
/// `heroBackgroundImage` absent keeps the current image, `null` or a blank
/// string clears it, anything else replaces it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, deserialize_with = "present")]
    pub hero_background_image: Option<Option<String>>,
}

/// Marks a field as present, even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Settings service.
pub struct SettingsService<'a> {
    settings: &'a dyn SettingsStore,
    images: &'a Arc<dyn ObjectStore>,
}

impl<'a> SettingsService<'a> {
    /// Create a new settings service.
    #[must_use]
    pub fn new(settings: &'a dyn SettingsStore, images: &'a Arc<dyn ObjectStore>) -> Self {
        Self { settings, images }
    }

    /// Current settings, created on first read.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn get(&self) -> Result<SiteSettings, ServiceError> {
        Ok(self.settings.get_or_create().await?)
    }

    /// Apply a partial update.
    ///
    /// A replaced or cleared image is deleted in the background when the
    /// store owns it.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, patch: SettingsPatch) -> Result<SiteSettings, ServiceError> {
        let Some(image) = patch.hero_background_image else {
            return self.get().await;
        };

        let image = image
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let (previous, settings) = self.settings.set_hero_image(image.as_deref()).await?;

        if let Some(previous) = previous {
            if settings.hero_background_image.as_deref() != Some(previous.as_str()) {
                spawn_cleanup(self.images, &previous);
            }
        }

        tracing::info!(
            hero_background_image = ?settings.hero_background_image,
            "Settings updated"
        );
        Ok(settings)
    }
}
