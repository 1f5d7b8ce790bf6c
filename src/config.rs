//! Service configuration.
//!
//! Loads configuration from environment variables once at startup into
//! immutable structs that are passed by reference into each component.
//! Nothing reads the environment after initialization.

use anyhow::{Context, Result};
use std::env;

use crate::token::DEFAULT_TOKEN_ENDPOINT;

/// Webhook server configuration.
///
/// Both secrets are optional at load time: a missing channel secret makes
/// signature verification fail closed (every delivery rejected), and a
/// missing API key makes the classifier fall back without a network call.
/// The `/health` endpoint reports which of the two are configured.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret for webhook signature verification.
    pub channel_secret: Option<String>,

    /// API key for the classification service.
    pub anthropic_api_key: Option<String>,

    /// Listening port (default: 3000).
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            channel_secret: non_empty(env::var("LINE_CHANNEL_SECRET").ok()),
            anthropic_api_key: non_empty(env::var("ANTHROPIC_API_KEY").ok()),
            port: env::var("PORT")
                .ok()
                .map(|v| v.parse().context("PORT must be a number"))
                .transpose()?
                .unwrap_or(3000),
        })
    }
}

/// Token Minter configuration. All key material is required; the minter
/// fails fast rather than producing an unsigned or missigned assertion.
#[derive(Debug, Clone)]
pub struct MintConfig {
    /// JSON-encoded RSA parameter set (JWK) for assertion signing.
    pub private_key_json: String,

    /// Key identifier placed in the assertion header.
    pub kid: String,

    /// Channel identifier used as both issuer and subject.
    pub channel_id: String,

    /// Token issuance endpoint.
    pub token_endpoint: String,
}

impl MintConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            private_key_json: env::var("LINE_PRIVATE_KEY")
                .context("LINE_PRIVATE_KEY must be set")?,
            kid: env::var("LINE_KID").context("LINE_KID must be set")?,
            channel_id: env::var("LINE_CHANNEL_ID").context("LINE_CHANNEL_ID must be set")?,
            token_endpoint: env::var("LINE_TOKEN_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_TOKEN_ENDPOINT.to_string()),
        })
    }
}

/// Treats empty and whitespace-only values as absent, so an empty
/// `LINE_CHANNEL_SECRET=` line behaves the same as an unset variable.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
