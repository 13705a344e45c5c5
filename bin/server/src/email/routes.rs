//! Mail API routes: the Gmail messages endpoint and the provider facade.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mailbridge_mail::{
    CredentialBundle, EmailProvider, EmailService, EmailSummary, MailApiError, MessageList,
    UnsupportedProviderError, service_for,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::{AppState, middleware::RequireUser};

/// Query parameters for the messages endpoint.
#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    #[serde(default = "default_max_results")]
    max_results: u32,
}

fn default_max_results() -> u32 {
    10
}

/// Request body for the messages endpoint. The caller supplies the
/// credential bundle it received from the link handshake.
#[derive(Debug, Deserialize)]
pub struct MessagesRequest {
    credentials: Option<CredentialBundle>,
}

/// Lists Gmail inbox messages using caller-supplied credentials.
pub async fn gmail_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MessagesQuery>,
    payload: Option<Json<MessagesRequest>>,
) -> Result<Json<MessageList>, EmailApiError> {
    let credentials = payload
        .and_then(|Json(request)| request.credentials)
        .ok_or(EmailApiError::MissingCredentials)?;

    let list = state
        .messages_client
        .list_messages(&credentials, query.max_results)
        .await
        .map_err(EmailApiError::Gmail)?;

    Ok(Json(list))
}

/// Query parameters selecting a mail provider.
#[derive(Debug, Deserialize)]
pub struct ProviderQuery {
    provider: String,
}

/// Lists unread messages for the verified caller.
pub async fn unread(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProviderQuery>,
    RequireUser(claims): RequireUser,
) -> Result<Json<Vec<EmailSummary>>, EmailApiError> {
    let service = service_for_name(&state, &query.provider)?;
    let messages = service
        .list_unread(&claims.subject)
        .await
        .map_err(|e| EmailApiError::Provider(e.to_string()))?;

    Ok(Json(messages))
}

/// Request body for sending a message.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    to: String,
    subject: String,
    body: String,
}

/// Sends a message on the verified caller's behalf.
pub async fn send(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProviderQuery>,
    RequireUser(claims): RequireUser,
    Json(request): Json<SendRequest>,
) -> Result<Json<serde_json::Value>, EmailApiError> {
    let service = service_for_name(&state, &query.provider)?;
    let sent = service
        .send(&claims.subject, &request.to, &request.subject, &request.body)
        .await
        .map_err(|e| EmailApiError::Provider(e.to_string()))?;

    if !sent {
        return Err(EmailApiError::SendFailed);
    }

    Ok(Json(
        serde_json::json!({ "message": "Email sent successfully" }),
    ))
}

/// Marks a message as read for the verified caller.
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path(email_id): Path<String>,
    Query(query): Query<ProviderQuery>,
    RequireUser(claims): RequireUser,
) -> Result<Json<serde_json::Value>, EmailApiError> {
    let service = service_for_name(&state, &query.provider)?;
    let marked = service
        .mark_read(&claims.subject, &email_id)
        .await
        .map_err(|e| EmailApiError::Provider(e.to_string()))?;

    if !marked {
        return Err(EmailApiError::MarkReadFailed);
    }

    Ok(Json(
        serde_json::json!({ "message": "Email marked as read successfully" }),
    ))
}

/// Resolves a provider name to its facade binding.
fn service_for_name(
    state: &AppState,
    provider_name: &str,
) -> Result<Box<dyn EmailService>, EmailApiError> {
    let provider: EmailProvider = provider_name.parse()?;
    let credentials = match provider {
        EmailProvider::Gmail => &state.google,
        EmailProvider::Outlook => &state.microsoft,
    };

    Ok(service_for(
        provider,
        credentials.client_id.clone(),
        credentials.client_secret.clone(),
    ))
}

/// Mail API errors, rendered as `{"detail": …}` bodies.
#[derive(Debug)]
pub enum EmailApiError {
    /// No credential bundle in the request.
    MissingCredentials,
    /// The Gmail messages API reported a fault.
    Gmail(MailApiError),
    /// The named provider is not supported.
    UnsupportedProvider,
    /// A facade operation reported a fault.
    Provider(String),
    /// The provider did not accept the message.
    SendFailed,
    /// The provider did not apply the read marker.
    MarkReadFailed,
}

impl From<UnsupportedProviderError> for EmailApiError {
    fn from(_: UnsupportedProviderError) -> Self {
        Self::UnsupportedProvider
    }
}

impl std::fmt::Display for EmailApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredentials => write!(f, "gmail credentials not provided"),
            Self::Gmail(e) => write!(f, "gmail API error: {e}"),
            Self::UnsupportedProvider => write!(f, "unsupported email provider"),
            Self::Provider(msg) => write!(f, "provider API error: {msg}"),
            Self::SendFailed => write!(f, "failed to send email"),
            Self::MarkReadFailed => write!(f, "failed to mark email as read"),
        }
    }
}

impl std::error::Error for EmailApiError {}

impl IntoResponse for EmailApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            Self::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "Gmail credentials not provided".to_string(),
            ),
            Self::Gmail(e) => {
                tracing::error!("gmail API error: {}", e);
                (StatusCode::BAD_REQUEST, format!("Gmail API error: {e}"))
            }
            Self::UnsupportedProvider => (
                StatusCode::BAD_REQUEST,
                "Unsupported email provider".to_string(),
            ),
            Self::Provider(msg) => {
                tracing::error!("provider API error: {}", msg);
                (StatusCode::BAD_REQUEST, format!("Provider API error: {msg}"))
            }
            Self::SendFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send email".to_string(),
            ),
            Self::MarkReadFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to mark email as read".to_string(),
            ),
        };

        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_results_defaults_to_ten() {
        let query: MessagesQuery =
            serde_json::from_str("{}").expect("deserialize empty query");
        assert_eq!(query.max_results, 10);
    }

    #[test]
    fn unsupported_provider_maps_to_error() {
        let err: EmailApiError = "yahoo"
            .parse::<EmailProvider>()
            .expect_err("unsupported")
            .into();
        assert!(matches!(err, EmailApiError::UnsupportedProvider));
    }

    #[test]
    fn send_request_deserializes() {
        let request: SendRequest = serde_json::from_str(
            r#"{"to": "a@example.com", "subject": "Hi", "body": "Hello"}"#,
        )
        .expect("deserialize");
        assert_eq!(request.to, "a@example.com");
    }
}
