//! Back-office dashboard summary.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::services::{InboxService, StatusCounts};
use crate::state::AppState;

/// Build the dashboard router.
///
/// Access is enforced by the page guard, not by an extractor.
pub fn router() -> Router<AppState> {
    Router::new().route("/admin", get(index))
}

/// Counts shown on the dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub product_count: i64,
    pub featured_count: i64,
    pub messages: StatusCounts,
}

/// Dashboard overview.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<DashboardSummary>, AppError> {
    let (product_count, featured_count) = state.products().counts().await?;
    let messages = InboxService::new(state.messages()).status_counts().await?;

    Ok(Json(DashboardSummary {
        product_count,
        featured_count,
        messages,
    }))
}
