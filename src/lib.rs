pub mod analysis;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod fetcher;
pub mod indicators;
pub mod models;

use anyhow::Context;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::commands::AppState;
use crate::config::AppConfig;
use crate::core::cache::SystemClock;
use crate::core::loader::Loader;
use crate::fetcher::SgsFetcher;

/// Installs the `tracing` subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

/// Wires the SGS fetcher and the shared cache into the application state.
pub fn build_state(config: AppConfig) -> Arc<AppState> {
    let fetcher = SgsFetcher::new(config.sgs_base_url.clone(), config.fetch_timeout);
    let loader = Loader::new(Arc::new(fetcher), config.cache_ttl, Arc::new(SystemClock));
    Arc::new(AppState { config, loader })
}

pub fn app(state: Arc<AppState>) -> Router {
    commands::api_router().with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env();
    let addr: SocketAddr = format!("{}:{}", config.bind, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.bind, config.port))?;

    tracing::info!(
        "SGS endpoint {} (timeout {:?}, cache ttl {:?})",
        config.sgs_base_url,
        config.fetch_timeout,
        config.cache_ttl
    );

    let app = app(build_state(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Macro dashboard listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping");
}
