//! Authentication module for the mailbridge server.
//!
//! This module provides:
//! - The identity-provider login dance (redirect, code exchange, logout)
//! - Bearer-token extraction and verification for protected routes
//! - The shared application state
//!
//! Every collaborator in [`AppState`] is constructor-injected so tests can
//! substitute provider endpoints and verifiers. There is no server-side
//! session store: the only cross-request state is a handful of short-lived
//! cookies owned by the handshake flows.

pub mod middleware;
pub mod oauth;
pub mod routes;

pub use middleware::RequireUser;
pub use oauth::{IdentityClient, IdentityTokenPayload};
pub use routes::{callback, login, logout, me};

use crate::config::{MailProviderConfig, ServerConfig};
use crate::email::link::MailLinkClient;
use mailbridge_identity::{IdentityConfig, TokenVerifier};
use mailbridge_mail::GmailMessagesClient;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    /// Identity-provider configuration.
    pub identity: IdentityConfig,
    /// OAuth2 client for the identity login dance.
    pub identity_client: IdentityClient,
    /// Verifier for inbound bearer tokens.
    pub verifier: Arc<dyn TokenVerifier>,
    /// OAuth2 client for the mail-link consent dance.
    pub link_client: MailLinkClient,
    /// REST client for the Gmail messages API.
    pub messages_client: GmailMessagesClient,
    /// Google provider credentials (facade bindings).
    pub google: MailProviderConfig,
    /// Microsoft provider credentials (facade bindings).
    pub microsoft: MailProviderConfig,
    /// Externally reachable base URL for redirect chains.
    pub public_base_url: String,
    /// Whether cookies carry the Secure flag.
    pub secure_cookies: bool,
}

impl AppState {
    /// Creates the application state from configuration and collaborators.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        identity_client: IdentityClient,
        verifier: Arc<dyn TokenVerifier>,
        link_client: MailLinkClient,
        messages_client: GmailMessagesClient,
    ) -> Self {
        Self {
            identity: config.identity,
            identity_client,
            verifier,
            link_client,
            messages_client,
            google: config.google,
            microsoft: config.microsoft,
            public_base_url: config.public_base_url,
            secure_cookies: config.http.secure_cookies,
        }
    }
}
