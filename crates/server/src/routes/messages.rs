//! Contact form and inbox route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use serde::Deserialize;
use tracing::instrument;

use trailforge_core::MessageId;

use crate::error::{ApiJson, ApiPath, ApiQuery, AppError};
use crate::middleware::RequireAdmin;
use crate::models::Message;
use crate::services::{InboxService, MessageInput};
use crate::state::AppState;

/// Build the messages router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages", get(index).post(create))
        .route("/messages/{id}", patch(update_status).delete(destroy))
}

/// Query parameters for the inbox listing.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub status: Option<String>,
}

/// Body of `PATCH /messages/{id}`.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// Accept a contact form submission.
#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<MessageInput>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let message = InboxService::new(state.messages()).submit(input).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// List messages newest first.
#[instrument(skip(state, _admin))]
pub async fn index(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MessageQuery>,
) -> Result<Json<Vec<Message>>, AppError> {
    let messages = InboxService::new(state.messages())
        .list(query.status.as_deref())
        .await?;
    Ok(Json(messages))
}

/// Move a message to another status.
#[instrument(skip(state, _admin))]
pub async fn update_status(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<MessageId>,
    ApiJson(body): ApiJson<StatusUpdate>,
) -> Result<Json<Message>, AppError> {
    let message = InboxService::new(state.messages())
        .update_status(id, &body.status)
        .await?;
    Ok(Json(message))
}

/// Delete a message and return it.
#[instrument(skip(state, _admin))]
pub async fn destroy(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<MessageId>,
) -> Result<Json<Message>, AppError> {
    Ok(Json(InboxService::new(state.messages()).delete(id).await?))
}
