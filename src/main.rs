mod auth;
mod config;
mod error;
mod gemini;
mod generation;
mod models;
mod prompt;
mod provider;
mod routes;
mod storage;
mod store;
mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, EnvFilter};

use crate::auth::TokenService;
use crate::config::Config;
use crate::generation::ImageGenerator;
use crate::routes::AppState;
use crate::store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    let image_provider = provider::from_config(&config);
    let storage = storage::from_config(&config);
    tracing::info!(
        provider = image_provider.name(),
        storage = storage.name(),
        "Providers selected"
    );

    let state = AppState {
        store: Arc::new(Store::default()),
        generator: Arc::new(ImageGenerator::new(image_provider)),
        storage,
        tokens: Arc::new(TokenService::new(&config.jwt_secret)),
        max_images_per_request: config.max_images_per_request,
    };

    let app = routes::router(state)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
