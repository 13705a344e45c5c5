//! Router assembly for the mailbridge server.

use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{self, AppState};
use crate::config::HttpConfig;
use crate::email;

/// Builds the application router with all routes and layers.
#[must_use]
pub fn router(state: Arc<AppState>, http_config: &HttpConfig) -> Router {
    Router::new()
        // Identity dance
        .route("/auth/login", get(auth::login))
        .route("/auth/callback", get(auth::callback))
        .route("/auth/logout", get(auth::logout))
        .route("/auth/me", get(auth::me))
        // Mail-link dance
        .route("/email/google/connect", get(email::connect))
        .route("/email/google/auth", get(email::link_start))
        .route("/email/google/callback", get(email::link_callback))
        // Mail API
        .route("/email/gmail/messages", post(email::gmail_messages))
        .route("/email/unread", get(email::unread))
        .route("/email/send", post(email::send))
        .route("/email/mark-read/{email_id}", post(email::mark_read))
        // Liveness
        .route("/", get(root))
        .route("/health", get(health))
        .layer(cors_layer(http_config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(http_config: &HttpConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = http_config
        .allowed_origins()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to the mailbridge API",
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
