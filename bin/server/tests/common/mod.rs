//! Shared test harness: config fixtures, stub verifiers, router assembly.

use async_trait::async_trait;
use axum::Router;
use mailbridge_identity::{IdentityClaims, IdentityConfig, TokenVerifier, VerifierError};
use mailbridge_mail::GmailMessagesClient;
use mailbridge_server::{
    app,
    auth::{AppState, IdentityClient},
    config::{HttpConfig, MailProviderConfig, ServerConfig},
    email::MailLinkClient,
};
use std::sync::Arc;

/// Verifier that accepts every token with fixed claims.
pub struct StaticVerifier {
    claims: IdentityClaims,
}

impl StaticVerifier {
    pub fn new(subject: &str) -> Self {
        Self {
            claims: IdentityClaims::new(subject.to_string())
                .with_email(Some(format!("{subject}@example.com")))
                .with_display_name(Some("Test User".to_string())),
        }
    }
}

#[async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, _bearer_token: &str) -> Result<IdentityClaims, VerifierError> {
        Ok(self.claims.clone())
    }
}

/// Verifier that rejects every token.
pub struct RejectingVerifier;

#[async_trait]
impl TokenVerifier for RejectingVerifier {
    async fn verify(&self, _bearer_token: &str) -> Result<IdentityClaims, VerifierError> {
        Err(VerifierError::Rejected { status: 401 })
    }
}

pub fn base_config() -> ServerConfig {
    ServerConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        public_base_url: "http://localhost:8000".to_string(),
        http: HttpConfig {
            secure_cookies: false,
            allowed_origins: "http://localhost:3000".to_string(),
        },
        identity: IdentityConfig::new(
            "tenant.auth.example".to_string(),
            "identity-client".to_string(),
            "identity-secret".to_string(),
            "https://api.example.com".to_string(),
            "http://localhost:8000/auth/callback".to_string(),
        ),
        google: MailProviderConfig {
            client_id: "google-client".to_string(),
            client_secret: "google-secret".to_string(),
            redirect_uri: Some("http://localhost:8000/email/google/callback".to_string()),
        },
        microsoft: MailProviderConfig {
            client_id: "microsoft-client".to_string(),
            client_secret: "microsoft-secret".to_string(),
            redirect_uri: None,
        },
        assistant_api_key: None,
    }
}

/// Collaborator overrides for building a test router.
pub struct TestApp {
    pub config: ServerConfig,
    pub verifier: Arc<dyn TokenVerifier>,
    pub identity_client: Option<IdentityClient>,
    pub link_client: Option<MailLinkClient>,
    pub messages_client: Option<GmailMessagesClient>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self {
            config: base_config(),
            verifier: Arc::new(RejectingVerifier),
            identity_client: None,
            link_client: None,
            messages_client: None,
        }
    }
}

impl TestApp {
    pub fn with_verifier(mut self, verifier: Arc<dyn TokenVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn with_identity_endpoints(mut self, auth_url: String, token_url: String) -> Self {
        let client = IdentityClient::with_endpoints(&self.config.identity, auth_url, token_url)
            .expect("identity client");
        self.identity_client = Some(client);
        self
    }

    pub fn with_link_endpoints(mut self, auth_url: String, token_url: String) -> Self {
        let client = MailLinkClient::with_endpoints(&self.config.google, auth_url, token_url)
            .expect("link client");
        self.link_client = Some(client);
        self
    }

    pub fn with_messages_base_url(mut self, base_url: String) -> Self {
        self.messages_client = Some(GmailMessagesClient::with_base_url(base_url));
        self
    }

    pub fn router(self) -> Router {
        let http_config = self.config.http.clone();
        let identity_client = self
            .identity_client
            .unwrap_or_else(|| IdentityClient::new(&self.config.identity).expect("identity client"));
        let link_client = self
            .link_client
            .unwrap_or_else(|| MailLinkClient::new(&self.config.google).expect("link client"));
        let messages_client = self.messages_client.unwrap_or_default();

        let state = Arc::new(AppState::new(
            self.config,
            identity_client,
            self.verifier,
            link_client,
            messages_client,
        ));

        app::router(state, &http_config)
    }
}
