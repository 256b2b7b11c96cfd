//! Trailforge Core - Shared types library.
//!
//! This crate provides common types used across all Trailforge components:
//! - `server` - Public site API and admin back office
//! - `cli` - Command-line tools for migrations, seeding and maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and static data - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`taxonomy`] - The static product category tree and tag validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod taxonomy;
pub mod types;

pub use taxonomy::{Category, ProductTags, SubCategory, TaxonomyError};
pub use types::*;
