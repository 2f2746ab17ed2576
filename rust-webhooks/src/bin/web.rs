//! Logify Web Server - Shopify webhook receiver.
//!
//! Authenticates every notification against the shared secret and applies
//! customer and shop changes to the SQLite store before acknowledging.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use logify::{router, AppState, Config, Database, Synchronizer, WebhookAuthenticator};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    let config = Config::from_env();
    info!(
        port = config.port,
        database_url = %config.database_url,
        database_max_connections = config.database_max_connections,
        max_body_bytes = config.max_body_bytes,
        duplicate_policy = ?config.duplicate_policy,
        shared_secret_configured = config.shared_secret.is_some(),
        "config_loaded"
    );

    let secret = config
        .shared_secret
        .clone()
        .context("SHOPIFY_SHARED_SECRET must be set")?;

    let db = Database::connect(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to connect to database")?;
    db.run_migrations()
        .await
        .context("Failed to run database migrations")?;

    let synchronizer = Synchronizer::new(db.clone(), config.duplicate_policy);
    let authenticator = WebhookAuthenticator::new(secret, config.max_body_bytes);
    let port = config.port;
    let app = router(AppState::new(config, synchronizer, authenticator));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
