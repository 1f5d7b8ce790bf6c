//! Webhook endpoint handler.
//!
//! Accepts platform webhook deliveries, validates signatures over the exact
//! raw body bytes, and runs the classification pipeline for each qualifying
//! event before acknowledging.
//!
//! The caller only ever sees two outcomes: `200 {"ok": true}` once
//! verification passes and the batch has been processed (regardless of
//! internal degradation), or `401 {"error": "Invalid signature"}` with no
//! processing at all. Anything slower or non-2xx triggers platform-side
//! redelivery, so internal failures stay internal.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::AppState;
use crate::pipeline::process_batch;
use crate::webhooks::{parse_envelope, verify_signature};

/// Header carrying the base64 HMAC-SHA256 signature of the raw body.
const HEADER_SIGNATURE: &str = "x-line-signature";

/// Errors that reach the webhook caller.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing or invalid signature.
    #[error("invalid signature")]
    InvalidSignature,
}

/// Acknowledgement body for accepted deliveries.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
}

/// Error body for rejected deliveries.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        match self {
            WebhookError::InvalidSignature => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody {
                    error: "Invalid signature",
                }),
            )
                .into_response(),
        }
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Required header: `X-Line-Signature` (base64 HMAC-SHA256 of the raw body)
/// - Body: JSON `{"events": [...]}`
///
/// # Response
///
/// - 200 `{"ok": true}`: signature valid, batch processed
/// - 401 `{"error": "Invalid signature"}`: signature missing/invalid, or no
///   channel secret configured (fail closed)
pub async fn webhook_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Ack>, WebhookError> {
    let signature = headers
        .get(HEADER_SIGNATURE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!("webhook delivery without a signature header");
            WebhookError::InvalidSignature
        })?;

    // Verify over the raw bytes BEFORE any parsing. A re-serialized body is
    // not guaranteed to be byte-identical to what the platform signed.
    let Some(secret) = app_state.channel_secret() else {
        warn!("no channel secret configured, rejecting delivery");
        return Err(WebhookError::InvalidSignature);
    };

    if !verify_signature(&body, signature, secret) {
        warn!("invalid webhook signature");
        return Err(WebhookError::InvalidSignature);
    }

    match parse_envelope(&body) {
        Ok(events) => {
            debug!(events = events.len(), "webhook batch parsed");
            let outcome =
                process_batch(events, app_state.classifier(), app_state.sink()).await;
            info!(
                processed = outcome.processed,
                skipped = outcome.skipped,
                "webhook batch processed"
            );
        }
        Err(e) => {
            // A signed-but-unparseable body never comes from the legitimate
            // platform. Acknowledge anyway: a non-2xx would only provoke
            // redelivery of the same payload.
            warn!(error = %e, "ignoring unparseable webhook body");
        }
    }

    Ok(Json(Ack { ok: true }))
}
