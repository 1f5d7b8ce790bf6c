//! HTTP server for the intake service.
//!
//! This module implements the HTTP server that:
//! - Accepts platform webhooks, validates signatures, and runs the
//!   classification pipeline before acknowledging
//! - Provides health checks for liveness probes
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts webhook deliveries (returns 200 `{"ok": true}`)
//! - `GET /health` - Returns 200 with configuration flags

use std::sync::Arc;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::webhook_handler;

use crate::classify::Classifier;
use crate::sink::RecordSink;

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor. Everything
/// inside is read-only after construction; requests share no mutable state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Channel secret for HMAC-SHA256 signature verification.
    /// `None` means every delivery is rejected (fail closed).
    channel_secret: Option<Vec<u8>>,

    /// Classification client.
    classifier: Classifier,

    /// Destination for classification outcomes.
    sink: Arc<dyn RecordSink>,
}

impl AppState {
    /// Creates a new `AppState` with the given configuration.
    pub fn new(
        channel_secret: Option<Vec<u8>>,
        classifier: Classifier,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                channel_secret,
                classifier,
                sink,
            }),
        }
    }

    /// Returns the channel secret, if configured.
    pub fn channel_secret(&self) -> Option<&[u8]> {
        self.inner.channel_secret.as_deref()
    }

    /// Returns the classification client.
    pub fn classifier(&self) -> &Classifier {
        &self.inner.classifier
    }

    /// Returns the record sink.
    pub fn sink(&self) -> &dyn RecordSink {
        self.inner.sink.as_ref()
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_handler))
        .with_state(app_state)
}
