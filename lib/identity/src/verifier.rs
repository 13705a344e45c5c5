//! Bearer-token verification against the identity provider.
//!
//! Verification delegates to the provider's userinfo endpoint: the inbound
//! token is presented as a bearer credential and the provider's answer is
//! the source of truth. No local signature verification is performed.

use crate::claims::IdentityClaims;
use crate::error::VerifierError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Validates an inbound bearer token and produces the user's identity.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verifies a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the token, cannot be
    /// reached, or answers without a subject claim.
    async fn verify(&self, bearer_token: &str) -> Result<IdentityClaims, VerifierError>;
}

/// Verifier backed by the identity provider's userinfo endpoint.
pub struct UserinfoVerifier {
    http_client: reqwest::Client,
    userinfo_url: String,
}

impl UserinfoVerifier {
    /// Creates a verifier for the given userinfo endpoint URL.
    #[must_use]
    pub fn new(userinfo_url: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            userinfo_url,
        }
    }
}

#[async_trait]
impl TokenVerifier for UserinfoVerifier {
    async fn verify(&self, bearer_token: &str) -> Result<IdentityClaims, VerifierError> {
        let response = self
            .http_client
            .get(&self.userinfo_url)
            .bearer_auth(bearer_token)
            .send()
            .await
            .map_err(|e| VerifierError::Upstream {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "userinfo rejected token");
            return Err(VerifierError::Rejected {
                status: status.as_u16(),
            });
        }

        let user_info: HashMap<String, Value> =
            response
                .json()
                .await
                .map_err(|e| VerifierError::MalformedResponse {
                    reason: e.to_string(),
                })?;

        let subject = user_info
            .get("sub")
            .and_then(Value::as_str)
            .ok_or_else(|| VerifierError::MalformedResponse {
                reason: "no 'sub' claim in userinfo response".to_string(),
            })?
            .to_string();

        let email = user_info
            .get("email")
            .and_then(Value::as_str)
            .map(str::to_string);
        let display_name = user_info
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(IdentityClaims::new(subject)
            .with_email(email)
            .with_display_name(display_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn verify_extracts_claims_from_userinfo() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("authorization", "Bearer token-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "auth0|abc",
                "email": "user@example.com",
                "name": "Test User"
            })))
            .mount(&server)
            .await;

        let verifier = UserinfoVerifier::new(format!("{}/userinfo", server.uri()));
        let claims = verifier.verify("token-123").await.expect("verify");

        assert_eq!(claims.subject, "auth0|abc");
        assert_eq!(claims.email, Some("user@example.com".to_string()));
        assert_eq!(claims.display_name, Some("Test User".to_string()));
    }

    #[tokio::test]
    async fn verify_rejects_on_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let verifier = UserinfoVerifier::new(format!("{}/userinfo", server.uri()));
        let err = verifier.verify("bad-token").await.expect_err("rejected");

        assert_eq!(err, VerifierError::Rejected { status: 401 });
    }

    #[tokio::test]
    async fn verify_requires_subject_claim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "email": "user@example.com" })),
            )
            .mount(&server)
            .await;

        let verifier = UserinfoVerifier::new(format!("{}/userinfo", server.uri()));
        let err = verifier.verify("token").await.expect_err("malformed");

        assert!(matches!(err, VerifierError::MalformedResponse { .. }));
    }
}
