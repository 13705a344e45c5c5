//! Error types for the mail crate.

use std::fmt;

/// An unrecognized mail-provider name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedProviderError {
    /// The name that failed to match a provider.
    pub provider: String,
}

impl fmt::Display for UnsupportedProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported email provider: '{}'", self.provider)
    }
}

impl std::error::Error for UnsupportedProviderError {}

/// Errors from facade-level mail operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailServiceError {
    /// The provider reported a fault.
    Provider { reason: String },
    /// The operation did not complete.
    Failed { operation: String },
}

impl fmt::Display for MailServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider { reason } => write!(f, "provider fault: {reason}"),
            Self::Failed { operation } => write!(f, "operation '{operation}' failed"),
        }
    }
}

impl std::error::Error for MailServiceError {}

/// Errors from the Gmail REST binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailApiError {
    /// The API answered with a non-success status.
    Api { status: u16, body: String },
    /// The API could not be reached.
    Transport { reason: String },
    /// The API answered with a payload that could not be decoded.
    Decode { reason: String },
}

impl fmt::Display for MailApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api { status, body } => {
                write!(f, "mail API error (status {status}): {body}")
            }
            Self::Transport { reason } => {
                write!(f, "mail API unreachable: {reason}")
            }
            Self::Decode { reason } => {
                write!(f, "mail API response decode failed: {reason}")
            }
        }
    }
}

impl std::error::Error for MailApiError {}
