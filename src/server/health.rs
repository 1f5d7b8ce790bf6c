//! Health check endpoint for liveness probes.
//!
//! Returns 200 OK with a small JSON body reporting which credentials are
//! configured, so a deployment can be checked without sending a signed
//! webhook.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AppState;

/// Health check response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `"ok"` when the server is able to respond.
    pub status: &'static str,

    /// Server time at the moment of the check (UTC).
    pub timestamp: DateTime<Utc>,

    /// Whether a webhook channel secret is configured. Without one, every
    /// delivery is rejected.
    pub channel_secret_configured: bool,

    /// Whether a classification API key is configured. Without one, every
    /// message gets the fallback result.
    pub claude_configured: bool,
}

/// Health check handler.
pub async fn health_handler(State(app_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        channel_secret_configured: app_state.channel_secret().is_some(),
        claude_configured: app_state.classifier().is_configured(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifier;
    use crate::sink::ConsoleSink;
    use std::sync::Arc;

    #[tokio::test]
    async fn health_reports_missing_credentials() {
        let state = AppState::new(
            None,
            Classifier::new(None).unwrap(),
            Arc::new(ConsoleSink),
        );

        let Json(body) = health_handler(State(state)).await;

        assert_eq!(body.status, "ok");
        assert!(!body.channel_secret_configured);
        assert!(!body.claude_configured);
    }

    #[tokio::test]
    async fn health_reports_configured_credentials() {
        let state = AppState::new(
            Some(b"secret".to_vec()),
            Classifier::new(Some("key".into())).unwrap(),
            Arc::new(ConsoleSink),
        );

        let Json(body) = health_handler(State(state)).await;

        assert!(body.channel_secret_configured);
        assert!(body.claude_configured);
    }
}
