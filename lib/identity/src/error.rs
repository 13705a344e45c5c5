//! Error types for token verification.

use std::fmt;

/// Errors from verifying an inbound bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifierError {
    /// The provider rejected the token (non-success userinfo response).
    Rejected { status: u16 },
    /// The provider could not be reached.
    Upstream { reason: String },
    /// The provider's response lacked the required claims.
    MalformedResponse { reason: String },
}

impl fmt::Display for VerifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { status } => {
                write!(f, "token rejected by identity provider (status {status})")
            }
            Self::Upstream { reason } => {
                write!(f, "identity provider unreachable: {reason}")
            }
            Self::MalformedResponse { reason } => {
                write!(f, "malformed userinfo response: {reason}")
            }
        }
    }
}

impl std::error::Error for VerifierError {}
