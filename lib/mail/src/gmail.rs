//! Gmail REST binding for message listing.
//!
//! Credentials are supplied per call; the client holds nothing but an HTTP
//! client and the API base URL (overridable for tests).

use crate::credentials::CredentialBundle;
use crate::error::MailApiError;
use crate::message::{EmailSummary, MessageList};
use reqwest::Client;
use serde::Deserialize;

const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

/// Client for the Gmail messages API.
#[derive(Debug, Clone)]
pub struct GmailMessagesClient {
    http_client: Client,
    base_url: String,
}

impl Default for GmailMessagesClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GmailMessagesClient {
    /// Creates a client against the production Gmail API.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(GMAIL_API_BASE.to_string())
    }

    /// Creates a client against a specific base URL.
    #[must_use]
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http_client: Client::new(),
            base_url,
        }
    }

    /// Lists inbox messages with metadata, newest first.
    ///
    /// Performs one list call followed by a metadata fetch per message id,
    /// projecting each into an [`EmailSummary`].
    ///
    /// # Errors
    ///
    /// Returns an error on any non-success answer or transport fault.
    pub async fn list_messages(
        &self,
        credentials: &CredentialBundle,
        max_results: u32,
    ) -> Result<MessageList, MailApiError> {
        let url = format!(
            "{}/users/me/messages?maxResults={}&labelIds=INBOX",
            self.base_url, max_results
        );
        let list: GmailMessageListResponse =
            self.fetch(&credentials.access_token, &url).await?;

        let mut messages = Vec::new();
        for stub in list.messages.unwrap_or_default() {
            let url = format!(
                "{}/users/me/messages/{}?format=metadata&metadataHeaders=From&metadataHeaders=Subject&metadataHeaders=Date",
                self.base_url, stub.id
            );
            let message: GmailMessageResponse =
                self.fetch(&credentials.access_token, &url).await?;
            messages.push(project_summary(message));
        }

        Ok(MessageList {
            messages,
            next_page_token: list.next_page_token,
            result_size_estimate: list.result_size_estimate,
        })
    }

    async fn fetch<T: for<'de> Deserialize<'de>>(
        &self,
        access_token: &str,
        url: &str,
    ) -> Result<T, MailApiError> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| MailApiError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| MailApiError::Transport {
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "gmail api request failed");
            return Err(MailApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| MailApiError::Decode {
            reason: e.to_string(),
        })
    }
}

fn project_summary(message: GmailMessageResponse) -> EmailSummary {
    let headers = message
        .payload
        .as_ref()
        .and_then(|p| p.headers.as_deref())
        .unwrap_or_default();

    let subject = header_value(headers, "Subject").unwrap_or_else(|| "No Subject".to_string());
    let from = header_value(headers, "From").unwrap_or_else(|| "Unknown".to_string());
    let date = header_value(headers, "Date").unwrap_or_else(|| "Unknown".to_string());

    EmailSummary {
        id: message.id,
        subject,
        from,
        date,
        snippet: message.snippet.unwrap_or_default(),
        label_ids: message.label_ids.unwrap_or_default(),
    }
}

fn header_value(headers: &[GmailHeader], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.clone())
}

// Gmail API response types. Fields mirror the API contract; not all are
// read directly.

#[derive(Debug, Clone, Deserialize)]
struct GmailMessageListResponse {
    messages: Option<Vec<GmailMessageStub>>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
    #[serde(rename = "resultSizeEstimate")]
    result_size_estimate: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
struct GmailMessageStub {
    id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct GmailMessageResponse {
    id: String,
    #[serde(rename = "labelIds")]
    label_ids: Option<Vec<String>>,
    snippet: Option<String>,
    payload: Option<GmailPayload>,
}

#[derive(Debug, Clone, Deserialize)]
struct GmailPayload {
    headers: Option<Vec<GmailHeader>>,
}

#[derive(Debug, Clone, Deserialize)]
struct GmailHeader {
    name: String,
    value: String,
}
