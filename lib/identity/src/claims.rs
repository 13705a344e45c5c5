//! User identity extracted from a verified bearer token.

/// Claims describing the authenticated user.
///
/// Produced by a [`TokenVerifier`](crate::TokenVerifier) per request; never
/// stored by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    /// The subject claim (unique user identifier from the provider).
    pub subject: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Display name (optional).
    pub display_name: Option<String>,
}

impl IdentityClaims {
    /// Creates claims for a subject.
    #[must_use]
    pub fn new(subject: String) -> Self {
        Self {
            subject,
            email: None,
            display_name: None,
        }
    }

    /// Sets the email claim.
    #[must_use]
    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = name;
        self
    }
}
