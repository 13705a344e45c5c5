//! End-to-end tests for the identity login and mail-link handshakes,
//! with wiremock standing in for the providers' token endpoints.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::TestApp;
use http_body_util::BodyExt;
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().expect("cookie header").to_string())
        .collect()
}

fn assert_handshake_cookies_cleared(response: &axum::response::Response) {
    let cookies = set_cookies(response);
    assert!(
        cookies
            .iter()
            .any(|c| c.starts_with("oauth_state=") && c.contains("Max-Age=0")),
        "state cookie not cleared: {cookies:?}"
    );
    assert!(
        cookies
            .iter()
            .any(|c| c.starts_with("identity_token=") && c.contains("Max-Age=0")),
        "identity cookie not cleared: {cookies:?}"
    );
}

#[tokio::test]
async fn login_redirects_to_the_identity_provider() {
    let app = TestApp::default().router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/login")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()[header::LOCATION]
        .to_str()
        .expect("location");
    assert!(location.starts_with(
        "https://tenant.auth.example/authorize?response_type=code&client_id=identity-client"
    ));
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn login_remembers_the_redirect_target() {
    let app = TestApp::default().router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/login?redirect_after_login=http://app.example.com/after")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookies = set_cookies(&response);
    let redirect_cookie = cookies
        .iter()
        .find(|c| c.starts_with("redirect_after_login="))
        .expect("redirect cookie");
    assert!(redirect_cookie.contains("redirect_after_login=http://app.example.com/after"));
    assert!(redirect_cookie.contains("HttpOnly"));
    assert!(redirect_cookie.contains("Max-Age=600"));
}

#[tokio::test]
async fn callback_returns_the_raw_token_payload() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-123",
            "token_type": "Bearer",
            "expires_in": 86400
        })))
        .mount(&provider)
        .await;

    let app = TestApp::default()
        .with_identity_endpoints(
            format!("{}/authorize", provider.uri()),
            format!("{}/oauth/token", provider.uri()),
        )
        .router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/callback?code=auth-code")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["access_token"], "tok-123");
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
async fn callback_bounces_to_the_remembered_target() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-123",
            "token_type": "Bearer"
        })))
        .mount(&provider)
        .await;

    let app = TestApp::default()
        .with_identity_endpoints(
            format!("{}/authorize", provider.uri()),
            format!("{}/oauth/token", provider.uri()),
        )
        .router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/callback?code=auth-code")
                .header(
                    header::COOKIE,
                    "redirect_after_login=http://app.example.com/after",
                )
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "http://app.example.com/after?access_token=tok-123"
    );

    // Consumed exactly once.
    let cookies = set_cookies(&response);
    assert!(
        cookies
            .iter()
            .any(|c| c.starts_with("redirect_after_login=") && c.contains("Max-Age=0")),
        "redirect cookie not cleared: {cookies:?}"
    );
}

#[tokio::test]
async fn callback_surfaces_upstream_rejection_as_bad_request() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(serde_json::json!({ "error": "invalid_grant" })),
        )
        .mount(&provider)
        .await;

    let app = TestApp::default()
        .with_identity_endpoints(
            format!("{}/authorize", provider.uri()),
            format!("{}/oauth/token", provider.uri()),
        )
        .router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/callback?code=bad-code")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Failed to exchange code for token");
}

#[tokio::test]
async fn logout_redirects_to_the_provider_logout() {
    let app = TestApp::default().router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/logout")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://tenant.auth.example/v2/logout?client_id=identity-client&returnTo=http://localhost:8000"
    );
}

#[tokio::test]
async fn connect_chains_into_the_identity_login() {
    let app = TestApp::default().router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/email/google/connect")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()[header::LOCATION]
        .to_str()
        .expect("location");
    assert!(location.starts_with("http://localhost:8000/auth/login?"));

    let url = Url::parse(location).expect("parse location");
    let target = url
        .query_pairs()
        .find(|(key, _)| key == "redirect_after_login")
        .map(|(_, value)| value.into_owned())
        .expect("redirect_after_login param");
    assert_eq!(target, "http://localhost:8000/email/google/auth");
}

#[tokio::test]
async fn link_start_without_any_token_is_unauthorized() {
    let app = TestApp::default().router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/email/google/auth")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "No authorization token provided");
}

#[tokio::test]
async fn link_start_sets_the_handshake_cookies() {
    let app = TestApp::default().router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/email/google/auth?token=identity-tok")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()[header::LOCATION]
        .to_str()
        .expect("location");
    assert!(location.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
    assert!(location.contains("prompt=consent"));
    assert!(location.contains("access_type=offline"));

    let cookies = set_cookies(&response);
    let state_cookie = cookies
        .iter()
        .find(|c| c.starts_with("oauth_state="))
        .expect("state cookie");
    assert!(state_cookie.contains("HttpOnly"));
    assert!(state_cookie.contains("Max-Age=600"));
    let identity_cookie = cookies
        .iter()
        .find(|c| c.starts_with("identity_token="))
        .expect("identity cookie");
    assert!(identity_cookie.contains("identity_token=identity-tok"));
}

#[tokio::test]
async fn link_start_prefers_the_authorization_header() {
    let app = TestApp::default().router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/email/google/auth?token=from-query")
                .header(header::AUTHORIZATION, "Bearer from-header")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookies = set_cookies(&response);
    assert!(
        cookies
            .iter()
            .any(|c| c.contains("identity_token=from-header")),
        "header token not ferried: {cookies:?}"
    );
}

#[tokio::test]
async fn link_callback_without_state_cookie_is_rejected() {
    let app = TestApp::default().router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/email/google/callback?code=abc&state=x")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_handshake_cookies_cleared(&response);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing state parameter");
}

#[tokio::test]
async fn link_callback_with_mismatched_state_is_rejected() {
    let app = TestApp::default().router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/email/google/callback?code=abc&state=attacker")
                .header(
                    header::COOKIE,
                    "oauth_state=expected; identity_token=idtok",
                )
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_handshake_cookies_cleared(&response);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid state parameter");
}

#[tokio::test]
async fn link_callback_with_provider_error_is_rejected() {
    let app = TestApp::default().router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/email/google/callback?error=access_denied")
                .header(
                    header::COOKIE,
                    "oauth_state=expected; identity_token=idtok",
                )
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_handshake_cookies_cleared(&response);
    let body = body_json(response).await;
    assert_eq!(body["error"], "OAuth error");
    assert_eq!(body["detail"], "access_denied");
}

#[tokio::test]
async fn link_callback_without_identity_cookie_is_unauthorized() {
    let app = TestApp::default().router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/email/google/callback?code=abc&state=expected")
                .header(header::COOKIE, "oauth_state=expected")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_handshake_cookies_cleared(&response);
    let body = body_json(response).await;
    assert_eq!(body["error"], "No identity token found");
}

#[tokio::test]
async fn link_callback_exchanges_the_code_and_renders_the_bundle() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.mail-token",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "1//mail-refresh",
            "scope": "https://www.googleapis.com/auth/gmail.readonly"
        })))
        .mount(&provider)
        .await;

    let app = TestApp::default()
        .with_link_endpoints(
            format!("{}/auth", provider.uri()),
            format!("{}/token", provider.uri()),
        )
        .router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/email/google/callback?code=consent-code&state=expected")
                .header(
                    header::COOKIE,
                    "oauth_state=expected; identity_token=idtok",
                )
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_handshake_cookies_cleared(&response);

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    let page = String::from_utf8(bytes.to_vec()).expect("utf8 page");
    assert!(page.contains("ya29.mail-token"));
    assert!(page.contains("1//mail-refresh"));
    assert!(page.contains("/email/gmail/messages"));
}

#[tokio::test]
async fn link_callback_clears_cookies_when_the_exchange_fails() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({ "error": "invalid_grant" })),
        )
        .mount(&provider)
        .await;

    let app = TestApp::default()
        .with_link_endpoints(
            format!("{}/auth", provider.uri()),
            format!("{}/token", provider.uri()),
        )
        .router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/email/google/callback?code=expired-code&state=expected")
                .header(
                    header::COOKIE,
                    "oauth_state=expected; identity_token=idtok",
                )
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_handshake_cookies_cleared(&response);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Failed to complete Gmail authentication");
}
