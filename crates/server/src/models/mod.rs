//! Domain models for the server.
//!
//! These are validated domain objects shared by repositories, services and
//! route handlers. Request bodies live next to their handlers in `routes`.

pub mod message;
pub mod product;
pub mod session;
pub mod settings;

pub use message::{Message, NewMessage};
pub use product::{Product, ProductDraft, ProductFilter};
pub use session::{AdminSession, keys as session_keys};
pub use settings::{SETTINGS_ID, SiteSettings};
