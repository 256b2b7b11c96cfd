//! HTTP middleware for the server.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span)
//! 4. Session layer (tower-sessions)
//! 5. Back-office page guard

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{OptionalAdmin, RequireAdmin, admin_page_guard, clear_admin, set_admin};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use session::{SESSION_COOKIE_NAME, create_session_layer, postgres_store, server_session_layer};
