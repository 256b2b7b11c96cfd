//! Trailforge server library.
//!
//! The public site API and the back office as a library, so the router can be
//! driven by integration tests and the stores reused by the CLI.
//!
//! # Security
//!
//! Every write to the catalog, inbox and settings requires a back-office
//! session, which is only granted for the shared `ADMIN_PASSWORD`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
