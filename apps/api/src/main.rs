mod config;
mod content;
mod errors;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::content::{ContentEngine, FsContentStore, ResolutionSettings};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting question bank API v{}", env!("CARGO_PKG_VERSION"));

    if !config.content_root.is_dir() {
        tracing::warn!(
            "Content root {} does not exist; every lookup will miss",
            config.content_root.display()
        );
    }

    let store = Arc::new(FsContentStore::new(&config.content_root));
    let engine = ContentEngine::new(store, ResolutionSettings::from(&config));
    info!(
        "Content root {} ({:?}, page size {})",
        config.content_root.display(),
        config.strictness,
        config.page_size
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        engine,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
