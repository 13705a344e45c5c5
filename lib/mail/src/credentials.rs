//! Mail-provider credential bundle.
//!
//! The bundle is produced at the end of a mail-link handshake and handed
//! back to the caller. The server never stores it; every mail operation
//! re-authenticates implicitly via the bundle supplied in the request.

use serde::{Deserialize, Serialize};

/// Token material for one linked mail account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialBundle {
    /// The provider access token.
    pub access_token: String,
    /// The provider refresh token, if one was granted.
    pub refresh_token: Option<String>,
    /// The provider's token endpoint URI (for later refreshes by the
    /// caller).
    pub token_uri: String,
    /// The OAuth2 client ID the tokens were issued to.
    pub client_id: String,
    /// The scopes actually granted.
    pub scopes: Vec<String>,
}
