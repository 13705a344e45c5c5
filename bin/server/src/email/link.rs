//! Gmail account-link handshake.
//!
//! This module chains the already-authenticated identity into the mail
//! provider's consent dance:
//!
//! - `/email/google/connect` bounces through `/auth/login`, pointing the
//!   post-login redirect back at `/email/google/auth`
//! - `/email/google/auth` requires a usable identity token, then redirects
//!   to the provider's consent screen with a random state value; the state
//!   and the identity token ride across the redirect boundary in two
//!   short-lived cookies
//! - `/email/google/callback` verifies the state before any exchange,
//!   trades the code for tokens, and hands the resulting credential bundle
//!   back to the caller
//!
//! A handshake is single-use: both cookies are deleted on every callback
//! outcome, success or failure.

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use mailbridge_mail::CredentialBundle;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl, basic::BasicClient,
};
use serde::Deserialize;
use std::sync::Arc;
use time::Duration as TimeDuration;
use url::Url;

use crate::auth::AppState;
use crate::config::MailProviderConfig;

/// Google OAuth authorization URL.
const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google OAuth token URL.
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Scopes requested for the linked mail account.
const GMAIL_LINK_SCOPES: &[&str] = &["https://www.googleapis.com/auth/gmail.readonly"];

/// Cookie name for the handshake state value.
const STATE_COOKIE: &str = "oauth_state";

/// Cookie name ferrying the identity token across the redirect boundary.
const IDENTITY_COOKIE: &str = "identity_token";

/// Handshake cookies expire on their own after this long.
const HANDSHAKE_COOKIE_TTL: TimeDuration = TimeDuration::minutes(10);

/// OAuth2 client for the mail provider's consent dance.
#[derive(Clone, Debug)]
pub struct MailLinkClient {
    client_id: String,
    client_secret: String,
    auth_url: String,
    token_url: String,
    redirect_url: String,
}

impl MailLinkClient {
    /// Creates a client from the provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no redirect URI is configured or a URL is
    /// invalid.
    pub fn new(config: &MailProviderConfig) -> Result<Self, LinkError> {
        Self::with_endpoints(
            config,
            GOOGLE_AUTH_URL.to_string(),
            GOOGLE_TOKEN_URL.to_string(),
        )
    }

    /// Creates a client with explicit authorize/token endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if no redirect URI is configured or a URL is
    /// invalid.
    pub fn with_endpoints(
        config: &MailProviderConfig,
        auth_url: String,
        token_url: String,
    ) -> Result<Self, LinkError> {
        let redirect_url = config
            .redirect_uri
            .as_ref()
            .ok_or(LinkError::NotConfigured)?
            .clone();

        let _ = RedirectUrl::new(redirect_url.clone())
            .map_err(|e| LinkError::Configuration(format!("invalid redirect URL: {e}")))?;

        Ok(Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_url,
            token_url,
            redirect_url,
        })
    }

    /// Generates the consent-screen URL plus the state value bound to this
    /// handshake attempt.
    ///
    /// Offline access and a forced consent prompt guarantee a refresh token
    /// even on repeat authorizations.
    #[must_use]
    pub fn authorization_url(&self) -> (String, String) {
        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_auth_uri(AuthUrl::new(self.auth_url.clone()).expect("valid auth URL"))
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_url.clone()).expect("valid redirect URL"),
            );

        let mut auth_request = client.authorize_url(CsrfToken::new_random);
        for scope in GMAIL_LINK_SCOPES {
            auth_request = auth_request.add_scope(Scope::new((*scope).to_string()));
        }
        auth_request = auth_request
            .add_extra_param("access_type", "offline")
            .add_extra_param("include_granted_scopes", "true")
            .add_extra_param("prompt", "consent");

        let (auth_url, csrf_token) = auth_request.url();

        (auth_url.to_string(), csrf_token.secret().clone())
    }

    /// Exchanges the authorization code for a credential bundle.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-success answer or transport fault.
    pub async fn exchange_code(&self, code: &str) -> Result<CredentialBundle, LinkError> {
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| LinkError::TokenExchange(format!("HTTP client error: {e}")))?;

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
            .map_err(|e| LinkError::TokenExchange(format!("token exchange failed: {e}")))?;

        Ok(CredentialBundle {
            access_token: token_result.access_token().secret().clone(),
            refresh_token: token_result.refresh_token().map(|t| t.secret().clone()),
            token_uri: self.token_url.clone(),
            client_id: self.client_id.clone(),
            scopes: token_result
                .scopes()
                .map(|scopes| scopes.iter().map(|s| s.to_string()).collect())
                .unwrap_or_default(),
        })
    }
}

/// Query parameters for starting the link dance.
#[derive(Debug, Deserialize)]
pub struct LinkStartQuery {
    token: Option<String>,
    access_token: Option<String>,
}

/// Query parameters for the provider's consent callback.
#[derive(Debug, Deserialize)]
pub struct LinkCallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Picks the identity token from the supported sources, in precedence
/// order: Authorization header, `token` query, `access_token` query,
/// identity cookie.
fn identity_token_from(
    authorization: Option<&str>,
    token: Option<&str>,
    access_token: Option<&str>,
    cookie_token: Option<&str>,
) -> Option<String> {
    if let Some(header_value) = authorization {
        let value = header_value
            .strip_prefix("Bearer ")
            .unwrap_or(header_value);
        return Some(value.to_string());
    }

    token
        .or(access_token)
        .or(cookie_token)
        .map(str::to_string)
}

/// The callback transition table.
///
/// Evaluates one consent callback against the handshake cookies and either
/// yields the authorization code to exchange or the terminal failure. The
/// state comparison happens before anything else touches the provider.
fn callback_transition(
    query: &LinkCallbackQuery,
    state_cookie: Option<&str>,
    identity_cookie: Option<&str>,
) -> Result<String, LinkError> {
    if let Some(error) = &query.error {
        return Err(LinkError::ProviderError {
            detail: error.clone(),
        });
    }

    let (callback_state, cookie_state) = match (query.state.as_deref(), state_cookie) {
        (Some(callback_state), Some(cookie_state)) => (callback_state, cookie_state),
        _ => return Err(LinkError::MissingState),
    };

    if callback_state != cookie_state {
        return Err(LinkError::StateMismatch);
    }

    if identity_cookie.is_none() {
        return Err(LinkError::MissingIdentityToken);
    }

    match &query.code {
        Some(code) => Ok(code.clone()),
        None => Err(LinkError::MissingCode),
    }
}

/// One-click connection flow: chain into the identity login with the
/// post-login redirect pointed back at the link dance.
pub async fn connect(State(state): State<Arc<AppState>>) -> Result<Redirect, LinkError> {
    let base = state.public_base_url.trim_end_matches('/');
    let mut login_url = Url::parse(&format!("{base}/auth/login"))
        .map_err(|e| LinkError::Configuration(format!("invalid public base URL: {e}")))?;
    login_url
        .query_pairs_mut()
        .append_pair("redirect_after_login", &format!("{base}/email/google/auth"));

    tracing::info!(url = %login_url, "redirecting into identity login");
    Ok(Redirect::to(login_url.as_str()))
}

/// Starts the consent dance for an authenticated caller.
pub async fn link_start(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LinkStartQuery>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<impl IntoResponse, LinkError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let cookie_token = jar.get(IDENTITY_COOKIE).map(|c| c.value().to_string());

    let identity_token = identity_token_from(
        authorization,
        query.token.as_deref(),
        query.access_token.as_deref(),
        cookie_token.as_deref(),
    )
    .ok_or(LinkError::MissingAuthorization)?;

    let (auth_url, state_value) = state.link_client.authorization_url();
    tracing::info!("starting mail-link consent dance");

    let state_cookie = Cookie::build((STATE_COOKIE, state_value))
        .path("/")
        .http_only(true)
        .secure(state.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(HANDSHAKE_COOKIE_TTL);

    let identity_cookie = Cookie::build((IDENTITY_COOKIE, identity_token))
        .path("/")
        .http_only(true)
        .secure(state.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(HANDSHAKE_COOKIE_TTL);

    Ok((
        jar.add(state_cookie).add(identity_cookie),
        Redirect::to(&auth_url),
    ))
}

/// Handles the provider's consent callback.
pub async fn link_callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LinkCallbackQuery>,
    jar: CookieJar,
) -> Response {
    let outcome = process_callback(&state, &query, &jar).await;

    // Single-use handshake: both cookies go away whatever the outcome.
    let jar = jar
        .add(removal_cookie(STATE_COOKIE))
        .add(removal_cookie(IDENTITY_COOKIE));

    match outcome {
        Ok(page) => (jar, page).into_response(),
        Err(e) => (jar, e).into_response(),
    }
}

async fn process_callback(
    state: &AppState,
    query: &LinkCallbackQuery,
    jar: &CookieJar,
) -> Result<Html<String>, LinkError> {
    let state_cookie = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    let identity_cookie = jar.get(IDENTITY_COOKIE).map(|c| c.value().to_string());

    let code = callback_transition(query, state_cookie.as_deref(), identity_cookie.as_deref())?;

    let bundle = state.link_client.exchange_code(&code).await?;
    tracing::info!("mail account linked");

    Ok(Html(confirmation_page(&state.public_base_url, &bundle)))
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .max_age(TimeDuration::ZERO)
        .build()
}

/// Renders the confirmation view that immediately exercises the messages
/// endpoint with the freshly issued credential bundle.
fn confirmation_page(public_base_url: &str, bundle: &CredentialBundle) -> String {
    let messages_url = format!(
        "{}/email/gmail/messages",
        public_base_url.trim_end_matches('/')
    );
    let bundle_json = serde_json::to_string(bundle).expect("serialize credential bundle");

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <title>Mail Account Linked</title>
    <style>
      body {{ font-family: sans-serif; margin: 40px; }}
      .success {{ color: green; }}
      table {{ width: 100%; border-collapse: collapse; margin-top: 20px; }}
      th, td {{ padding: 8px; text-align: left; border-bottom: 1px solid #ddd; }}
      #error {{ color: red; display: none; }}
    </style>
  </head>
  <body>
    <h1 class="success">Mail account linked</h1>
    <p>Your Gmail account has been connected. Loading your messages&hellip;</p>
    <div id="error"></div>
    <table>
      <thead>
        <tr><th>From</th><th>Subject</th><th>Preview</th><th>Date</th></tr>
      </thead>
      <tbody id="messages"></tbody>
    </table>
    <script>
      fetch("{messages_url}", {{
        method: "POST",
        headers: {{ "Content-Type": "application/json" }},
        body: JSON.stringify({{ credentials: {bundle_json} }})
      }})
      .then((response) => response.json())
      .then((data) => {{
        const body = document.getElementById("messages");
        data.messages.forEach((message) => {{
          const row = document.createElement("tr");
          row.innerHTML = `<td>${{message.from}}</td><td><strong>${{message.subject}}</strong></td>` +
            `<td>${{message.snippet}}</td><td>${{message.date}}</td>`;
          body.appendChild(row);
        }});
      }})
      .catch((error) => {{
        const div = document.getElementById("error");
        div.style.display = "block";
        div.textContent = "Error loading messages: " + error;
      }});
    </script>
  </body>
</html>
"#
    )
}

/// Mail-link handshake errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The provider's OAuth client is not configured.
    NotConfigured,
    /// Configuration error.
    Configuration(String),
    /// No identity token in any of the supported sources.
    MissingAuthorization,
    /// The provider reported an error on the callback.
    ProviderError { detail: String },
    /// Callback state or state cookie absent.
    MissingState,
    /// Callback state and state cookie are unequal.
    StateMismatch,
    /// The identity-token cookie is absent at callback time.
    MissingIdentityToken,
    /// No authorization code on the callback.
    MissingCode,
    /// Token exchange failed.
    TokenExchange(String),
}

impl std::fmt::Display for LinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "mail provider OAuth is not configured"),
            Self::Configuration(msg) => write!(f, "configuration error: {msg}"),
            Self::MissingAuthorization => write!(f, "no authorization token provided"),
            Self::ProviderError { detail } => write!(f, "provider error: {detail}"),
            Self::MissingState => write!(f, "missing state parameter"),
            Self::StateMismatch => write!(f, "state parameter mismatch"),
            Self::MissingIdentityToken => write!(f, "no identity token found"),
            Self::MissingCode => write!(f, "missing authorization code"),
            Self::TokenExchange(msg) => write!(f, "token exchange error: {msg}"),
        }
    }
}

impl std::error::Error for LinkError {}

impl IntoResponse for LinkError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::NotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                serde_json::json!({ "error": "Mail integration not available" }),
            ),
            Self::Configuration(msg) => {
                tracing::error!("mail-link configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "Failed to start Gmail connection flow" }),
                )
            }
            Self::MissingAuthorization => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "error": "No authorization token provided" }),
            ),
            Self::ProviderError { detail } => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "OAuth error", "detail": detail }),
            ),
            Self::MissingState => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "Missing state parameter" }),
            ),
            Self::StateMismatch => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "Invalid state parameter" }),
            ),
            Self::MissingIdentityToken => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "error": "No identity token found" }),
            ),
            Self::MissingCode => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "Missing authorization code" }),
            ),
            Self::TokenExchange(msg) => {
                tracing::error!("mail-link token exchange failed: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    serde_json::json!({ "error": "Failed to complete Gmail authentication" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
