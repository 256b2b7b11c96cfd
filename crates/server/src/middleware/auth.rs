//! Authentication middleware and extractors for the back office.
//!
//! The back office has one shared password. A successful login stores an
//! [`AdminSession`] marker in the session; everything here only checks for
//! that marker.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use url::form_urlencoded;

use crate::error::AppError;
use crate::models::{AdminSession, session_keys};

/// Login page the guard redirects to.
pub const LOGIN_PATH: &str = "/admin/login";

/// Paths under `/admin` reachable without a session.
const PUBLIC_ADMIN_PATHS: &[&str] = &[LOGIN_PATH, "/admin/auth"];

/// Extractor that requires an authenticated admin session.
///
/// Rejects with 401 `{ "error": "Unauthorized" }`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Logged in at {}", admin.logged_in_at)
/// }
/// ```
pub struct RequireAdmin(pub AdminSession);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_admin(parts.extensions.get::<Session>())
            .await
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))
    }
}

/// Extractor that optionally gets the admin session.
pub struct OptionalAdmin(pub Option<AdminSession>);

impl<S> FromRequestParts<S> for OptionalAdmin
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_admin(parts.extensions.get::<Session>()).await))
    }
}

/// Read the admin marker, treating session errors as logged out.
async fn current_admin(session: Option<&Session>) -> Option<AdminSession> {
    match session?.get::<AdminSession>(session_keys::ADMIN).await {
        Ok(admin) => admin,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read admin session");
            None
        }
    }
}

/// Redirect unauthenticated requests for back-office pages to the login page.
///
/// Applies to `/admin` and everything below it except the login page and the
/// auth endpoint. The original path is passed along as `redirect`.
pub async fn admin_page_guard(request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if !is_guarded(path) {
        return next.run(request).await;
    }

    if current_admin(request.extensions().get::<Session>())
        .await
        .is_some()
    {
        return next.run(request).await;
    }

    let target = login_redirect(path);
    tracing::debug!(path, "Redirecting to login");
    Redirect::to(&target).into_response()
}

fn is_guarded(path: &str) -> bool {
    let under_admin = path == "/admin" || path.starts_with("/admin/");
    under_admin && !PUBLIC_ADMIN_PATHS.contains(&path.trim_end_matches('/'))
}

/// `/admin/login?redirect=<path>`.
fn login_redirect(path: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(path.as_bytes()).collect();
    format!("{LOGIN_PATH}?redirect={encoded}")
}

/// Mark the session as authenticated, rotating its id first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::ADMIN, AdminSession::now()).await
}

/// Destroy the session (logout).
///
/// # Errors
///
/// Returns an error if the session store cannot be updated.
pub async fn clear_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
