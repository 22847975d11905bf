//! Web server module for handling inbound webhooks.
//!
//! Routes:
//! - `POST /webhook/github`: verify and forward a GitHub delivery to NodeBB
//! - `GET /health`: liveness probe
//! - anything else: `404 {}`

pub mod handlers;
pub mod signature;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{github_webhook, health, not_found, AppState};
pub use signature::{check, sign, verify, SignatureError, SIGNATURE_HEADER};

/// Largest delivery GitHub sends (25 MB).
pub const MAX_DELIVERY_BYTES: usize = 25 * 1024 * 1024;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health).fallback(not_found))
        .route(
            "/webhook/github",
            post(github_webhook)
                .fallback(not_found)
                .layer(DefaultBodyLimit::max(MAX_DELIVERY_BYTES)),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
