//! Mail-provider integration for the mailbridge platform.
//!
//! This crate provides:
//!
//! - **`EmailService` trait**: Uniform capability interface over mail
//!   providers (list unread, send, mark read)
//! - **`EmailProvider`**: Closed provider dispatch with an explicit error
//!   for unknown names
//! - **`CredentialBundle`**: Mail-provider token material returned to the
//!   caller after a link handshake and resupplied on every data call
//! - **`GmailMessagesClient`**: REST binding for listing Gmail messages
//!   with per-call credentials

pub mod credentials;
pub mod error;
pub mod gmail;
pub mod message;
pub mod provider;
pub mod service;

pub use credentials::CredentialBundle;
pub use error::{MailApiError, MailServiceError, UnsupportedProviderError};
pub use gmail::GmailMessagesClient;
pub use message::{EmailSummary, MessageList};
pub use provider::EmailProvider;
pub use service::{EmailService, GmailService, OutlookService, service_for};
