//! Identity-provider configuration.
//!
//! This module provides the configuration type for connecting to an external
//! identity provider (e.g. Auth0) that performs user login and issues bearer
//! tokens. The provider exposes plain OAuth2 endpoints derived from its
//! domain; there is no discovery step.

use serde::{Deserialize, Serialize};

/// Configuration for the external identity provider.
///
/// Fields with defaults can be omitted when loading from environment
/// variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// The provider domain (e.g. "tenant.eu.auth0.com"), without scheme.
    domain: String,
    /// The OAuth2 client ID registered with the provider.
    client_id: String,
    /// The OAuth2 client secret.
    client_secret: String,
    /// The API audience tokens are issued for.
    audience: String,
    /// The redirect URI for the OAuth2 callback
    /// (e.g. "http://localhost:8000/auth/callback").
    redirect_uri: String,
    /// OAuth2 scopes to request as a comma-separated string.
    /// Default: "openid,profile,email"
    #[serde(default = "default_scopes")]
    scopes: String,
    /// Where the provider sends the browser after logout.
    /// Default: "http://localhost:8000"
    #[serde(default = "default_post_logout_redirect")]
    post_logout_redirect: String,
}

fn default_scopes() -> String {
    "openid,profile,email".to_string()
}

fn default_post_logout_redirect() -> String {
    "http://localhost:8000".to_string()
}

impl IdentityConfig {
    /// Creates a new configuration with defaults for optional fields.
    #[must_use]
    pub fn new(
        domain: String,
        client_id: String,
        client_secret: String,
        audience: String,
        redirect_uri: String,
    ) -> Self {
        Self {
            domain,
            client_id,
            client_secret,
            audience,
            redirect_uri,
            scopes: default_scopes(),
            post_logout_redirect: default_post_logout_redirect(),
        }
    }

    /// Sets the OAuth2 scopes to request (comma-separated).
    #[must_use]
    pub fn with_scopes(mut self, scopes: String) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the post-logout return URL.
    #[must_use]
    pub fn with_post_logout_redirect(mut self, url: String) -> Self {
        self.post_logout_redirect = url;
        self
    }

    /// Returns the provider domain.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Returns the OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth2 client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the API audience.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Returns the OAuth2 redirect URI.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns the OAuth2 scopes to request, parsed from the
    /// comma-separated string.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes.split(',').map(str::trim).collect()
    }

    /// Returns the authorization endpoint URL.
    #[must_use]
    pub fn authorize_url(&self) -> String {
        format!("https://{}/authorize", self.domain)
    }

    /// Returns the token endpoint URL.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("https://{}/oauth/token", self.domain)
    }

    /// Returns the userinfo endpoint URL.
    #[must_use]
    pub fn userinfo_url(&self) -> String {
        format!("https://{}/userinfo", self.domain)
    }

    /// Returns the logout URL, including client id and return target.
    #[must_use]
    pub fn logout_url(&self) -> String {
        format!(
            "https://{}/v2/logout?client_id={}&returnTo={}",
            self.domain, self.client_id, self.post_logout_redirect
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> IdentityConfig {
        IdentityConfig::new(
            "tenant.auth.example".to_string(),
            "client-id".to_string(),
            "client-secret".to_string(),
            "https://api.example.com".to_string(),
            "http://localhost:8000/auth/callback".to_string(),
        )
    }

    #[test]
    fn new_config_has_default_scopes() {
        let config = config();
        assert_eq!(config.scopes(), vec!["openid", "profile", "email"]);
    }

    #[test]
    fn endpoint_urls_derive_from_domain() {
        let config = config();
        assert_eq!(
            config.authorize_url(),
            "https://tenant.auth.example/authorize"
        );
        assert_eq!(config.token_url(), "https://tenant.auth.example/oauth/token");
        assert_eq!(
            config.userinfo_url(),
            "https://tenant.auth.example/userinfo"
        );
    }

    #[test]
    fn logout_url_carries_client_id_and_return_target() {
        let config = config();
        assert_eq!(
            config.logout_url(),
            "https://tenant.auth.example/v2/logout?client_id=client-id&returnTo=http://localhost:8000"
        );
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let json = r#"{
            "domain": "tenant.auth.example",
            "client_id": "my-client",
            "client_secret": "secret",
            "audience": "https://api.example.com",
            "redirect_uri": "http://localhost:8000/auth/callback"
        }"#;

        let config: IdentityConfig = serde_json::from_str(json).expect("deserialize");

        assert_eq!(config.domain(), "tenant.auth.example");
        assert_eq!(config.scopes(), vec!["openid", "profile", "email"]);
        assert_eq!(config.post_logout_redirect, "http://localhost:8000");
    }

    #[test]
    fn scopes_parses_comma_separated() {
        let config = config().with_scopes("openid, profile, email, offline_access".to_string());
        assert_eq!(
            config.scopes(),
            vec!["openid", "profile", "email", "offline_access"]
        );
    }
}
