//! Site settings route handlers.

use axum::{Json, Router, extract::State, routing::get};
use tracing::instrument;

use crate::error::{ApiJson, AppError};
use crate::middleware::RequireAdmin;
use crate::models::SiteSettings;
use crate::services::{SettingsPatch, SettingsService};
use crate::state::AppState;

/// Build the settings router.
pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(show).put(update))
}

/// Current site settings.
pub async fn show(State(state): State<AppState>) -> Result<Json<SiteSettings>, AppError> {
    let settings = SettingsService::new(state.settings(), state.images())
        .get()
        .await?;
    Ok(Json(settings))
}

/// Apply a partial settings update.
#[instrument(skip(state, _admin))]
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(patch): ApiJson<SettingsPatch>,
) -> Result<Json<SiteSettings>, AppError> {
    let settings = SettingsService::new(state.settings(), state.images())
        .update(patch)
        .await?;
    Ok(Json(settings))
}
