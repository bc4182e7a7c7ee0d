use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use gemini_relay::{upstream::GeminiClient, AppState, Config, GatewaySettings};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // -----------------------------
    // Logging
    // -----------------------------
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // -----------------------------
    // Config / Dependencies
    // -----------------------------
    let config = Config::from_env().context("invalid configuration")?;
    let settings = GatewaySettings::from_config(&config).context("invalid default schema")?;
    let gemini = GeminiClient::from_config(&config).context("failed to build Gemini client")?;

    info!(
        model = gemini.model(),
        require_schema = settings.require_schema,
        timeout = ?settings.upstream_timeout,
        "gateway configured"
    );

    let state = AppState {
        model: Arc::new(gemini),
        settings: Arc::new(settings),
    };
    let app = gemini_relay::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("listening on http://{addr}");
    info!("generate endpoint at http://{addr}/api/generate");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
