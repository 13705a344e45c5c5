//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables.
//!
//! See [`IdentityConfig`](mailbridge_identity::IdentityConfig) for the
//! identity-provider configuration.

use mailbridge_identity::IdentityConfig;
use serde::Deserialize;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address the server listens on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Externally reachable base URL, used to build redirect chains.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// HTTP-layer configuration (cookies, CORS).
    #[serde(default)]
    pub http: HttpConfig,

    /// Identity-provider configuration.
    pub identity: IdentityConfig,

    /// Google mail-provider OAuth2 credentials.
    pub google: MailProviderConfig,

    /// Microsoft mail-provider OAuth2 credentials (stub binding).
    pub microsoft: MailProviderConfig,

    /// Reserved key for the mail-summary assistant; nothing in this
    /// service consumes it yet.
    #[serde(default)]
    pub assistant_api_key: Option<String>,
}

/// HTTP-layer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP
    /// development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,

    /// Allowed CORS origins as a comma-separated string.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,
}

/// OAuth2 client credentials for one mail provider.
#[derive(Debug, Clone, Deserialize)]
pub struct MailProviderConfig {
    /// The OAuth2 client ID registered with the provider.
    pub client_id: String,
    /// The OAuth2 client secret.
    pub client_secret: String,
    /// The redirect URI for the provider's consent callback. Only the
    /// providers with a wired consent flow need one.
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_secure_cookies() -> bool {
    true
}

fn default_allowed_origins() -> String {
    "http://localhost:3000".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            secure_cookies: default_secure_cookies(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl HttpConfig {
    /// Returns the allowed CORS origins, parsed from the comma-separated
    /// string.
    #[must_use]
    pub fn allowed_origins(&self) -> Vec<&str> {
        self.allowed_origins.split(',').map(str::trim).collect()
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
