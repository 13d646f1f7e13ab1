//! Observer HTTP server lifecycle.
//!
//! [`start_server`] binds the configured address and serves the router
//! until the process receives a shutdown signal. Shutdown pauses the
//! tick driver first, so no further frames are produced while in-flight
//! requests drain.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::ServerSection;
use crate::router::build_router;
use crate::state::AppState;

/// Errors that can occur when starting or running the observer server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The configured address could not be resolved or bound.
    #[error("failed to bind {host}:{port}: {source}")]
    Bind {
        /// Configured host.
        host: String,
        /// Configured port.
        port: u16,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The server terminated abnormally.
    #[error("server terminated abnormally: {source}")]
    Serve {
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Serve the observer API until shutdown.
///
/// Binds the configured address (hostnames are resolved), then serves
/// the router. On `SIGINT` the tick driver is paused and the server
/// finishes in-flight requests before returning.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] when the address cannot be resolved or
/// bound, or [`ServerError::Serve`] on a fatal I/O error while serving.
pub async fn start_server(config: &ServerSection, state: Arc<AppState>) -> Result<(), ServerError> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| ServerError::Bind {
            host: config.host.clone(),
            port: config.port,
            source,
        })?;

    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Observer server listening");
    }

    let shutdown_state = Arc::clone(&state);
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown(shutdown_state))
        .await
        .map_err(|source| ServerError::Serve { source })?;

    info!("Observer server stopped");
    Ok(())
}

/// Resolve when the process should shut down, pausing the driver first.
async fn shutdown(state: Arc<AppState>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            state.driver.pause();
            info!("Shutdown signal received; driver paused");
        }
        Err(e) => {
            // With no signal handler there is no clean way down; keep
            // serving rather than exit on a spurious error.
            error!(error = %e, "Failed to install shutdown handler");
            std::future::pending::<()>().await;
        }
    }
}
