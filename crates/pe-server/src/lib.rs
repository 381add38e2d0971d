//! # pe-server
//!
//! The external enhancement service: accepts raw prompt text over HTTP,
//! validates and sanitizes it, forwards it to the provider with a bounded
//! timeout and retry/backoff, strips formatting artifacts from the reply
//! and returns the enhanced prompt with usage accounting.

pub mod config;
pub mod error;
pub mod handlers;
pub mod provider;
pub mod rate_limit;
pub mod routes;
pub mod sanitize;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use routes::{router, AppState};

/// Bind and serve until ctrl-c.
pub async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let environment = config.environment.clone();
    let model = config.provider.model.clone();

    let state = Arc::new(AppState::new(config)?);
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, environment, model, "enhancement service listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("enhancement service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received shutdown signal, draining connections");
    }
}
