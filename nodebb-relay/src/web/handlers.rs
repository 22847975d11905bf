//! HTTP endpoint handlers.
//!
//! The webhook handler:
//! 1. Verifies the signature over the raw body
//! 2. Creates a NodeBB topic from the payload
//! 3. Acknowledges the delivery with `200 {}`

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::delivery::WebhookDelivery;
use crate::error::RelayError;
use crate::forum::{sender_login, ForumNotifier, NotifierSetupError};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub notifier: ForumNotifier,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, NotifierSetupError> {
        let notifier = ForumNotifier::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            notifier,
        })
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check endpoint.
pub async fn health() -> Json<Value> {
    Json(json!({}))
}

/// Response for every unmatched path or method.
pub async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({})))
}

// =============================================================================
// GitHub Webhook
// =============================================================================

/// GitHub webhook endpoint.
pub async fn github_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let delivery = WebhookDelivery::new(&headers, body);

    info!(
        github_event = headers
            .get("x-github-event")
            .and_then(|v| v.to_str().ok())
            .unwrap_or(""),
        delivery_id = headers
            .get("x-github-delivery")
            .and_then(|v| v.to_str().ok())
            .unwrap_or(""),
        body_length = delivery.body.len(),
        has_signature = delivery.signature.is_some(),
        "github_webhook_received"
    );

    match relay(&state, &delivery).await {
        Ok(()) => (StatusCode::OK, Json(json!({}))).into_response(),
        Err(e) => {
            match &e {
                RelayError::SignatureMissing | RelayError::SignatureMismatch => {
                    warn!(reason = %e, "github_signature_invalid")
                }
                RelayError::MalformedRequest(_) => warn!(error = %e, "github_payload_malformed"),
                _ => error!(error = %e, "nodebb_forward_failed"),
            }
            e.into_response_with(state.config.expose_upstream_errors)
        }
    }
}

async fn relay(state: &AppState, delivery: &WebhookDelivery) -> Result<(), RelayError> {
    let payload = delivery.verify(state.config.github_webhook_secret.as_bytes())?;

    state.notifier.notify(&payload).await?;

    info!(
        sender = sender_login(payload.value()),
        received_at = %delivery.received_at,
        "github_webhook_forwarded"
    );

    Ok(())
}
