mod config;
mod errors;
mod extract;
mod generation;
mod llm_client;
mod models;
mod render;
mod routes;
mod session;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Forge API v{}", env!("CARGO_PKG_VERSION"));

    let generator = GeminiClient::new(config.gemini_api_base.clone())
        .context("failed to build the generation HTTP client")?;
    info!(
        "Generation client initialized (base: {}, default model: {})",
        config.gemini_api_base, config.default_model
    );
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY not set; sessions must supply their own credential");
    }

    let sessions = SessionStore::new(Duration::from_secs(config.session_idle_minutes * 60));
    sessions.spawn_expiry_task(Duration::from_secs(60));
    info!("Sessions expire after {} idle minutes", config.session_idle_minutes);

    let state = AppState {
        config: config.clone(),
        generator: Arc::new(generator),
        sessions,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
