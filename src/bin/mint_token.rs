//! Standalone channel access token minter.
//!
//! Runs once per invocation: validates the configured RSA signing
//! credential, signs a JWT assertion, exchanges it with the platform's
//! token endpoint, and prints the issued `{access_token, key_id}` as JSON
//! on stdout. All diagnostics go to stderr via tracing. Exits non-zero on
//! any failure, with the failing key field or the issuer's error payload
//! in the message.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_intake::config::MintConfig;
use chat_intake::token;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_intake=info,mint_token=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %format!("{e:#}"), "token minting failed");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = MintConfig::from_env().context("loading mint configuration")?;

    let token = token::mint(&config).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&token).context("serializing issued token")?
    );
    Ok(())
}
