//! Authentication routes for login, callback, logout, and identity lookup.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;
use time::Duration as TimeDuration;

use super::{AppState, middleware::RequireUser};

/// Cookie carrying the post-login redirect target across the dance.
const REDIRECT_COOKIE: &str = "redirect_after_login";

/// Handshake cookies expire on their own after this long.
const HANDSHAKE_COOKIE_TTL: TimeDuration = TimeDuration::minutes(10);

/// Query parameters for login.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    redirect_after_login: Option<String>,
}

/// Query parameters for the identity callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: String,
}

/// Initiates the login flow by redirecting to the identity provider.
///
/// When a `redirect_after_login` target is supplied it is remembered in a
/// short-lived cookie, to be consumed exactly once by the callback.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoginQuery>,
    jar: CookieJar,
) -> impl IntoResponse {
    let auth_url = state.identity_client.authorization_url();

    let jar = match query.redirect_after_login {
        Some(target) => {
            let cookie = Cookie::build((REDIRECT_COOKIE, target))
                .path("/")
                .http_only(true)
                .secure(state.secure_cookies)
                .same_site(SameSite::Lax)
                .max_age(HANDSHAKE_COOKIE_TTL);
            jar.add(cookie)
        }
        None => jar,
    };

    (jar, Redirect::to(&auth_url))
}

/// Handles the identity-provider callback.
///
/// Exchanges the authorization code for a token. If a redirect target was
/// remembered at login time, the browser is bounced there with the access
/// token appended and the cookie is deleted; otherwise the raw token
/// payload is the response body.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<Response, AuthError> {
    let payload = state
        .identity_client
        .exchange_code(&query.code)
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

    match jar.get(REDIRECT_COOKIE) {
        Some(cookie) => {
            let location = format!("{}?access_token={}", cookie.value(), payload.access_token);
            let remove_redirect = Cookie::build((REDIRECT_COOKIE, ""))
                .path("/")
                .max_age(TimeDuration::ZERO);

            Ok((jar.add(remove_redirect), Redirect::to(&location)).into_response())
        }
        None => Ok(Json(payload).into_response()),
    }
}

/// Logs out by redirecting to the identity provider's logout endpoint.
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Redirect::to(&state.identity.logout_url())
}

/// Returns the identity of the verified caller.
pub async fn me(RequireUser(claims): RequireUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "id": claims.subject,
        "email": claims.email,
        "name": claims.display_name,
    }))
}

/// Authentication errors.
#[derive(Debug)]
pub enum AuthError {
    TokenExchange(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::TokenExchange(msg) => {
                tracing::error!("identity token exchange failed: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({ "detail": "Failed to exchange code for token" })),
                )
                    .into_response()
            }
        }
    }
}
