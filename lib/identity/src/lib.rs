//! Identity-provider integration for the mailbridge platform.
//!
//! This crate provides:
//!
//! - **`IdentityConfig`**: Configuration for the external identity provider
//! - **`IdentityClaims`**: User identity extracted from a verified token
//! - **`TokenVerifier`**: Trait for validating inbound bearer tokens, with a
//!   userinfo-backed implementation
//!
//! The verifier is a constructor-injected collaborator: handlers receive it
//! as a trait object so tests can substitute a stub.

pub mod claims;
pub mod config;
pub mod error;
pub mod verifier;

pub use claims::IdentityClaims;
pub use config::IdentityConfig;
pub use error::VerifierError;
pub use verifier::{TokenVerifier, UserinfoVerifier};
