//! HTTP surface for the centrals analysis.

pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::wordpress::ContentRepository;

pub use state::AppState;

/// Build the application router.
pub fn router<R>(state: Arc<AppState<R>>) -> Router
where
    R: ContentRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/analytics/centrals-analysis",
            get(routes::centrals_analysis::<R>),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until interrupted.
pub async fn run(config: &Config) -> Result<()> {
    let state = Arc::new(AppState::from_config(config)?);
    let app = router(state);

    let address = config.server.bind_address();
    info!("Binding to {}", address);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!("Server running on {}", address);
    info!("Health check: http://{}/health", address);
    info!("Analysis: http://{}/analytics/centrals-analysis", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
