//! Message summary types, serialized with the Gmail wire casing.

use serde::{Deserialize, Serialize};

/// A single message summary as returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSummary {
    /// Provider-assigned message id.
    pub id: String,
    /// Subject line ("No Subject" when the header is absent).
    pub subject: String,
    /// Sender ("Unknown" when the header is absent).
    pub from: String,
    /// Date header value ("Unknown" when absent).
    pub date: String,
    /// Short plain-text preview.
    pub snippet: String,
    /// Provider label set.
    #[serde(rename = "labelIds")]
    pub label_ids: Vec<String>,
}

/// A page of message summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageList {
    /// The summaries on this page.
    pub messages: Vec<EmailSummary>,
    /// Token for the next page, passed through from the provider.
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
    /// Provider's estimate of the total result count.
    #[serde(rename = "resultSizeEstimate")]
    pub result_size_estimate: Option<u64>,
}
