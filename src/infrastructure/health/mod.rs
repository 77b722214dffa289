//! Liveness server for the hosting platform's health checks
//!
//! Runs in its own child process. Every method and path answers 200 with a
//! fixed body; the server drains connections and exits on SIGTERM.

use axum::{routing::any, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;

use crate::application::errors::HealthError;
use crate::application::shutdown::{listen_for_signals, ShutdownController};
use crate::infrastructure::config::HealthConfig;

pub const SERVICE_NAME: &str = "beartech-bot";

#[derive(Debug, Serialize)]
struct Liveness {
    status: &'static str,
    service: &'static str,
}

async fn alive() -> Json<Liveness> {
    Json(Liveness {
        status: "alive",
        service: SERVICE_NAME,
    })
}

/// Liveness router: `/health` plus a catch-all for any other probe path
pub fn router() -> Router {
    Router::new()
        .route("/health", any(alive))
        .fallback(alive)
}

/// Bind `host:port` and serve until `shutdown` is requested
pub async fn serve(host: &str, port: u16, shutdown: ShutdownController) -> Result<(), HealthError> {
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| HealthError::Bind { addr: addr.clone(), source })?;

    tracing::info!("Starting health check server on port {}", port);

    axum::serve(listener, router())
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await?;

    tracing::info!("Health check server stopped");
    Ok(())
}

/// Entry point of the health child process
pub async fn run(config: &HealthConfig) -> Result<(), HealthError> {
    let shutdown = ShutdownController::new();
    let signals = listen_for_signals(shutdown.clone());

    let result = serve(&config.host, config.port, shutdown).await;
    signals.abort();

    if let Err(e) = &result {
        tracing::error!("Health server error: {}", e);
    }
    result
}
