use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_intake::classify::Classifier;
use chat_intake::config::Config;
use chat_intake::server::{build_router, AppState};
use chat_intake::sink::ConsoleSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_intake=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("loading configuration")?;

    if config.channel_secret.is_none() {
        tracing::warn!("LINE_CHANNEL_SECRET is not set; every delivery will be rejected");
    }
    if config.anthropic_api_key.is_none() {
        tracing::warn!("ANTHROPIC_API_KEY is not set; classification will use the fallback");
    }

    let classifier = Classifier::new(config.anthropic_api_key.clone())
        .context("building classification client")?;
    let state = AppState::new(
        config.channel_secret.clone().map(String::into_bytes),
        classifier,
        Arc::new(ConsoleSink),
    );

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
}
