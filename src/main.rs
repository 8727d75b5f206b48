//! Wine Recognition Service - Main Entry Point
//!
//! Forwards wine-bottle images to the RapidAPI wine-recognition provider and
//! returns ranked label candidates.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wine_recognition::config::Config;
use wine_recognition::handlers::AppState;
use wine_recognition::server::build_router;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "wine_recognition=info,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    info!("Starting Wine Recognition API v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "rapidapi_configured={} cors_origins={:?} timeout_seconds={} max_retries={}",
        config.is_configured(),
        config.allowed_origins(),
        config.timeout_seconds,
        config.max_retries
    );
    if !config.is_configured() {
        warn!("RAPIDAPI_KEY / RAPIDAPI_HOST not set; recognition endpoints will return 503");
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = Arc::new(AppState::from_config(config)?);
    let app = build_router(state);

    info!("Wine Recognition API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Wine Recognition API shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
