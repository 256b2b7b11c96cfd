//! Category taxonomy route.

use axum::{Json, Router, routing::get};

use trailforge_core::{Category, taxonomy};

use crate::state::AppState;

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new().route("/categories", get(index))
}

/// The static category taxonomy.
pub async fn index() -> Json<&'static [Category]> {
    Json(taxonomy::categories())
}
