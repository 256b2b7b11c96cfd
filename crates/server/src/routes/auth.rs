//! Back-office login and logout.
//!
//! The login page itself belongs to the frontend; `GET /admin/login` only
//! reports whether the visitor is already signed in and where to go next.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{ApiJson, ApiQuery, AppError};
use crate::middleware::{OptionalAdmin, clear_admin, set_admin};
use crate::state::AppState;

/// Where the frontend lands after login when no redirect was requested.
const DEFAULT_REDIRECT: &str = "/admin";

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/auth", post(login).delete(logout))
        .route("/admin/login", get(login_status))
}

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

/// Response for login and logout.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
}

/// Query parameters of the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub redirect: Option<String>,
}

/// Response for `GET /admin/login`.
#[derive(Debug, Serialize)]
pub struct LoginStatus {
    pub authenticated: bool,
    pub redirect: String,
}

/// Check the shared password and start an admin session.
#[instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if !state.password().verify(&body.password) {
        tracing::warn!("Rejected back-office login");
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    set_admin(&session).await?;
    tracing::info!("Back-office login");
    Ok(Json(AuthResponse { success: true }))
}

/// End the admin session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<AuthResponse>, AppError> {
    clear_admin(&session).await?;
    tracing::info!("Back-office logout");
    Ok(Json(AuthResponse { success: true }))
}

/// Login state for the frontend login page.
pub async fn login_status(
    OptionalAdmin(admin): OptionalAdmin,
    ApiQuery(query): ApiQuery<LoginQuery>,
) -> Json<LoginStatus> {
    Json(LoginStatus {
        authenticated: admin.is_some(),
        redirect: safe_redirect(query.redirect.as_deref()),
    })
}

/// Only same-site back-office paths are followed after login.
fn safe_redirect(target: Option<&str>) -> String {
    match target {
        Some(path) if path == "/admin" || path.starts_with("/admin/") => path.to_string(),
        _ => DEFAULT_REDIRECT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_redirect() {
        assert_eq!(safe_redirect(Some("/admin/messages")), "/admin/messages");
        assert_eq!(safe_redirect(Some("https://evil.example")), "/admin");
        assert_eq!(safe_redirect(Some("/products")), "/admin");
        assert_eq!(safe_redirect(None), "/admin");
    }
}
