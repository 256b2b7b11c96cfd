//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                - Liveness
//! GET    /health/ready          - Readiness (database)
//!
//! # Catalog
//! GET    /categories            - Category taxonomy
//! GET    /products              - Products in display order (?category&subCategory&featured)
//! POST   /products              - Create product            (admin)
//! PUT    /products/reorder      - Batch reorder             (admin)
//! GET    /products/{id}         - Product detail
//! PUT    /products/{id}         - Update product            (admin)
//! DELETE /products/{id}         - Delete product            (admin)
//!
//! # Inbox
//! POST   /messages              - Contact form submission
//! GET    /messages              - Inbox (?status)           (admin)
//! PATCH  /messages/{id}         - Change status             (admin)
//! DELETE /messages/{id}         - Delete message            (admin)
//!
//! # Settings & uploads
//! GET    /settings              - Site settings
//! PUT    /settings              - Update settings           (admin)
//! POST   /upload                - Multipart image upload    (admin)
//! GET    /uploads/*             - Local uploads (local backend only)
//!
//! # Back office
//! POST   /admin/auth            - Login
//! DELETE /admin/auth            - Logout
//! GET    /admin/login           - Login state
//! GET    /admin                 - Dashboard summary         (page guard)
//! ```

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod health;
pub mod messages;
pub mod products;
pub mod settings;
pub mod upload;

use std::time::Duration;

use axum::Router;
use axum::http::{Request, Response};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::Span;

use crate::middleware::{admin_page_guard, request_id_middleware};
use crate::state::AppState;

/// Build the application with sessions, request IDs and request tracing.
///
/// Sentry layers are added by the binary around the result.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    routes(&state)
        .layer(session_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}

/// Build all application routes.
///
/// The page guard needs a session, so the caller must add a session layer
/// outside the returned router.
pub fn routes(state: &AppState) -> Router<AppState> {
    let mut router = Router::new()
        .merge(health::router())
        .merge(categories::router())
        .merge(products::router())
        .merge(messages::router())
        .merge(settings::router())
        .merge(upload::router(state.max_upload_bytes()))
        .merge(auth::router())
        .merge(dashboard::router());

    if let Some(dir) = state.uploads_dir() {
        router = router.nest_service("/uploads", ServeDir::new(dir));
    }

    router.layer(axum::middleware::from_fn(admin_page_guard))
}
