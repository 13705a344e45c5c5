//! Mail-provider dispatch.
//!
//! Providers form a closed set; an unrecognized name is an explicit error
//! rather than a fallthrough.

use crate::error::UnsupportedProviderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported mail provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailProvider {
    /// Gmail (Google mail API).
    Gmail,
    /// Outlook (Microsoft Graph API).
    Outlook,
}

impl EmailProvider {
    /// Returns the provider's canonical name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gmail => "gmail",
            Self::Outlook => "outlook",
        }
    }
}

impl fmt::Display for EmailProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailProvider {
    type Err = UnsupportedProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gmail" => Ok(Self::Gmail),
            "outlook" => Ok(Self::Outlook),
            other => Err(UnsupportedProviderError {
                provider: other.to_string(),
            }),
        }
    }
}
