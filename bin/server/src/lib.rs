//! Mailbridge server library.
//!
//! The binary in `main.rs` wires configuration into [`auth::AppState`] and
//! serves the router from [`app`]. Everything lives behind the library
//! crate so integration tests can drive the router directly.

pub mod app;
pub mod auth;
pub mod config;
pub mod email;
