use mailbridge_identity::UserinfoVerifier;
use mailbridge_mail::GmailMessagesClient;
use mailbridge_server::{
    app,
    auth::{AppState, IdentityClient},
    config::ServerConfig,
    email::MailLinkClient,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    // Build the provider collaborators
    let identity_client =
        IdentityClient::new(&config.identity).expect("failed to build identity client");
    let verifier = Arc::new(UserinfoVerifier::new(config.identity.userinfo_url()));
    let link_client = MailLinkClient::new(&config.google).expect("failed to build mail-link client");
    let messages_client = GmailMessagesClient::new();

    let http_config = config.http.clone();
    let listen_addr = config.listen_addr.clone();

    let state = Arc::new(AppState::new(
        config,
        identity_client,
        verifier,
        link_client,
        messages_client,
    ));

    let app = app::router(state, &http_config);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", listen_addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("server error");
}
