//! OAuth2 client for the identity-provider login dance.
//!
//! The identity provider speaks plain OAuth2 against fixed endpoints
//! derived from its domain; there is no discovery step. The authorize URL
//! is pure construction, the code exchange is a server-to-server POST.

use mailbridge_identity::IdentityConfig;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl, basic::BasicClient,
};
use serde::Serialize;

/// OAuth2 client for the identity provider.
#[derive(Clone, Debug)]
pub struct IdentityClient {
    client_id: String,
    client_secret: String,
    auth_url: String,
    token_url: String,
    redirect_url: String,
    scopes: Vec<String>,
}

/// Raw token payload from a successful code exchange, returned to the
/// caller as-is.
#[derive(Debug, Clone, Serialize)]
pub struct IdentityTokenPayload {
    pub access_token: String,
    pub token_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl IdentityClient {
    /// Creates a client from the identity-provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured URL is invalid.
    pub fn new(config: &IdentityConfig) -> Result<Self, AuthFlowError> {
        Self::with_endpoints(config, config.authorize_url(), config.token_url())
    }

    /// Creates a client with explicit authorize/token endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if a URL is invalid.
    pub fn with_endpoints(
        config: &IdentityConfig,
        auth_url: String,
        token_url: String,
    ) -> Result<Self, AuthFlowError> {
        let _ = AuthUrl::new(auth_url.clone())
            .map_err(|e| AuthFlowError::Configuration(format!("invalid authorize URL: {e}")))?;
        let _ = TokenUrl::new(token_url.clone())
            .map_err(|e| AuthFlowError::Configuration(format!("invalid token URL: {e}")))?;
        let _ = RedirectUrl::new(config.redirect_uri().to_string())
            .map_err(|e| AuthFlowError::Configuration(format!("invalid redirect URL: {e}")))?;

        Ok(Self {
            client_id: config.client_id().to_string(),
            client_secret: config.client_secret().to_string(),
            auth_url,
            token_url,
            redirect_url: config.redirect_uri().to_string(),
            scopes: config.scopes().iter().map(|s| (*s).to_string()).collect(),
        })
    }

    /// Builds the authorization URL for redirecting the user to the
    /// provider's login page.
    #[must_use]
    pub fn authorization_url(&self) -> String {
        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_auth_uri(AuthUrl::new(self.auth_url.clone()).expect("valid auth URL"))
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_url.clone()).expect("valid redirect URL"),
            );

        let mut auth_request = client.authorize_url(CsrfToken::new_random);
        for scope in &self.scopes {
            auth_request = auth_request.add_scope(Scope::new(scope.clone()));
        }

        // The callback does not check state on this leg; the CSRF invariant
        // lives on the mail-link dance.
        let (auth_url, _csrf_token) = auth_request.url();
        auth_url.to_string()
    }

    /// Exchanges an authorization code for the provider's token payload.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-success answer or transport fault.
    pub async fn exchange_code(&self, code: &str) -> Result<IdentityTokenPayload, AuthFlowError> {
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthFlowError::TokenExchange(format!("HTTP client error: {e}")))?;

        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_token_uri(TokenUrl::new(self.token_url.clone()).expect("valid token URL"))
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_url.clone()).expect("valid redirect URL"),
            );

        let token_result = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&http_client)
            .await
            .map_err(|e| AuthFlowError::TokenExchange(format!("token exchange failed: {e}")))?;

        Ok(IdentityTokenPayload {
            access_token: token_result.access_token().secret().clone(),
            token_type: "Bearer".to_string(),
            expires_in: token_result.expires_in().map(|d| d.as_secs()),
            refresh_token: token_result.refresh_token().map(|t| t.secret().clone()),
            scope: token_result
                .scopes()
                .map(|scopes| {
                    scopes
                        .iter()
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .filter(|s| !s.is_empty()),
        })
    }
}

/// Identity-dance errors.
#[derive(Debug)]
pub enum AuthFlowError {
    /// Configuration error (invalid URLs, etc.)
    Configuration(String),
    /// Token exchange failed.
    TokenExchange(String),
}

impl std::fmt::Display for AuthFlowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "identity configuration error: {msg}"),
            Self::TokenExchange(msg) => write!(f, "identity token exchange error: {msg}"),
        }
    }
}

impl std::error::Error for AuthFlowError {}
