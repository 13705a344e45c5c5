//! Mail service facade.
//!
//! All providers implement the [`EmailService`] trait, giving the HTTP
//! layer a uniform interface keyed by a logical user id. The concrete
//! bindings are presently illustrative: they answer with fixed data until
//! the real provider calls are wired in (the worked REST binding lives in
//! [`crate::gmail`]).

use crate::error::MailServiceError;
use crate::message::EmailSummary;
use crate::provider::EmailProvider;
use async_trait::async_trait;

/// Capability interface over a mail provider.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Lists unread messages for a user.
    ///
    /// # Errors
    ///
    /// Returns an error on any upstream fault.
    async fn list_unread(&self, user_id: &str) -> Result<Vec<EmailSummary>, MailServiceError>;

    /// Sends a message on the user's behalf. Returns whether the provider
    /// accepted it.
    async fn send(
        &self,
        user_id: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<bool, MailServiceError>;

    /// Marks a message as read. Returns whether the provider applied the
    /// change.
    async fn mark_read(&self, user_id: &str, message_id: &str)
    -> Result<bool, MailServiceError>;
}

/// Builds the service binding for a provider.
#[must_use]
pub fn service_for(
    provider: EmailProvider,
    client_id: String,
    client_secret: String,
) -> Box<dyn EmailService> {
    match provider {
        EmailProvider::Gmail => Box::new(GmailService::new(client_id, client_secret)),
        EmailProvider::Outlook => Box::new(OutlookService::new(client_id, client_secret)),
    }
}

fn placeholder_summary() -> EmailSummary {
    EmailSummary {
        id: "1".to_string(),
        subject: "Test Email".to_string(),
        from: "test@example.com".to_string(),
        date: "Unknown".to_string(),
        snippet: String::new(),
        label_ids: vec!["UNREAD".to_string()],
    }
}

/// Gmail facade binding.
pub struct GmailService {
    client_id: String,
    // Held for the real binding's token refresh.
    #[allow(dead_code)]
    client_secret: String,
}

impl GmailService {
    /// Creates a Gmail binding from its OAuth2 client credentials.
    #[must_use]
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
        }
    }

    /// Returns the OAuth2 client ID this binding was built with.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

#[async_trait]
impl EmailService for GmailService {
    async fn list_unread(&self, user_id: &str) -> Result<Vec<EmailSummary>, MailServiceError> {
        // TODO: call the Gmail REST API with a caller-supplied credential
        // bundle once the facade routes carry one (see crate::gmail for the
        // worked messages binding).
        tracing::debug!(user_id, client = %self.client_id, "gmail list_unread (fixed response)");
        Ok(vec![placeholder_summary()])
    }

    async fn send(
        &self,
        user_id: &str,
        to: &str,
        _subject: &str,
        _body: &str,
    ) -> Result<bool, MailServiceError> {
        tracing::debug!(user_id, to, "gmail send (fixed response)");
        Ok(true)
    }

    async fn mark_read(
        &self,
        user_id: &str,
        message_id: &str,
    ) -> Result<bool, MailServiceError> {
        tracing::debug!(user_id, message_id, "gmail mark_read (fixed response)");
        Ok(true)
    }
}

/// Outlook facade binding.
pub struct OutlookService {
    client_id: String,
    // Held for the real binding's token refresh.
    #[allow(dead_code)]
    client_secret: String,
}

impl OutlookService {
    /// Creates an Outlook binding from its OAuth2 client credentials.
    #[must_use]
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
        }
    }
}

#[async_trait]
impl EmailService for OutlookService {
    async fn list_unread(&self, user_id: &str) -> Result<Vec<EmailSummary>, MailServiceError> {
        tracing::debug!(user_id, client = %self.client_id, "outlook list_unread (fixed response)");
        Ok(vec![placeholder_summary()])
    }

    async fn send(
        &self,
        user_id: &str,
        to: &str,
        _subject: &str,
        _body: &str,
    ) -> Result<bool, MailServiceError> {
        tracing::debug!(user_id, to, "outlook send (fixed response)");
        Ok(true)
    }

    async fn mark_read(
        &self,
        user_id: &str,
        message_id: &str,
    ) -> Result<bool, MailServiceError> {
        tracing::debug!(user_id, message_id, "outlook mark_read (fixed response)");
        Ok(true)
    }
}
