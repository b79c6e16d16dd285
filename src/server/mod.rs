//! HTTP service exposing the research pipeline.
//!
//! Endpoints:
//! - `GET /` service information
//! - `GET /health` liveness check
//! - `POST /research` run the pipeline for one question
//!
//! One [`crate::agent::Orchestrator`] is shared by all in-flight
//! requests; each request owns its run state.

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use tracing::info;

use crate::agent::Orchestrator;
use crate::error::{ResearchError, Result};

pub use config::ServeConfig;
pub use error::{ApiError, ApiResult};
pub use handlers::{AppState, ResearchRequest, create_router};

/// Binds the listener and serves requests until shutdown.
///
/// Shutdown is triggered by Ctrl+C or, on Unix, SIGTERM.
///
/// # Errors
///
/// Returns [`ResearchError::Orchestration`] for an invalid bind
/// configuration, a failed bind, or a server runtime failure.
pub async fn serve(orchestrator: Arc<Orchestrator>, config: ServeConfig) -> Result<()> {
    config
        .validate()
        .map_err(|message| ResearchError::Orchestration { message })?;
    let addr = config
        .socket_addr()
        .map_err(|message| ResearchError::Orchestration { message })?;

    let app = create_router().with_state(AppState::new(orchestrator));

    let listener =
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ResearchError::Orchestration {
                message: format!("failed to bind {addr}: {e}"),
            })?;

    info!(url = %config.server_url(), "research service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ResearchError::Orchestration {
            message: format!("server error: {e}"),
        })
}

/// Resolves when a shutdown signal arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received shutdown signal");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix;
        match unix::signal(unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received TERM signal");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
