//! Site-wide settings.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Primary key of the only settings row.
pub const SETTINGS_ID: &str = "settings";

/// Singleton site settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    /// Always [`SETTINGS_ID`].
    pub id: String,
    /// Home page hero background image URL, if one is set.
    pub hero_background_image: Option<String>,
    /// When the settings were last written.
    pub updated_at: DateTime<Utc>,
}

impl SiteSettings {
    /// Fresh settings with nothing configured.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            id: SETTINGS_ID.to_string(),
            hero_background_image: None,
            updated_at: Utc::now(),
        }
    }
}
