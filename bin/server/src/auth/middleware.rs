//! Authentication extractors for Axum.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{HeaderValue, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use mailbridge_identity::IdentityClaims;
use std::sync::Arc;

use super::AppState;

/// Extractor for requiring a verified bearer token.
///
/// The token is taken from the `Authorization` header and verified against
/// the identity provider; the resulting claims are handed to the handler.
pub struct RequireUser(pub IdentityClaims);

impl<S> FromRequestParts<S> for RequireUser
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthRejection::MissingToken)?;

        let token = header_value
            .strip_prefix("Bearer ")
            .unwrap_or(header_value);

        let claims = app_state.verifier.verify(token).await.map_err(|e| {
            tracing::debug!(error = %e, "bearer token verification failed");
            AuthRejection::InvalidToken
        })?;

        Ok(RequireUser(claims))
    }
}

/// Rejection type for the authentication extractor.
#[derive(Debug)]
pub enum AuthRejection {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let detail = match self {
            Self::MissingToken => "Not authenticated",
            Self::InvalidToken => "Could not validate credentials",
        };

        let mut response = (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "detail": detail })),
        )
            .into_response();
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        response
    }
}
