//! NodeBB relay web server.
//!
//! This binary:
//! - Receives GitHub webhook deliveries
//! - Verifies their HMAC-SHA256 signature
//! - Creates a NodeBB topic for each verified delivery
//! - Acknowledges the delivery once the topic exists

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nodebb_relay::config::load_dotenv;
use nodebb_relay::{router, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env files before reading RUST_LOG
    let dotenv_files = load_dotenv().context("Failed to load .env files")?;

    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!(dotenv_files = ?dotenv_files, "relay_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        nodebb_api_root = %config.nodebb_api_root,
        nodebb_event_topic = %config.nodebb_event_topic,
        request_timeout_ms = config.request_timeout_ms,
        expose_upstream_errors = config.expose_upstream_errors,
        "config_loaded"
    );

    if config.uses_default_secrets() {
        warn!("default_secret_in_use");
    }

    // Create application state
    let port = config.port;
    let state = AppState::new(config).context("Failed to build NodeBB client")?;
    info!(topics_url = %state.notifier.topics_url(), "nodebb_client_created");

    let app = router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "relay_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("relay_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "ctrl_c_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("relay_shutting_down");
}
