//! API server startup helper for embedding in the engine binary.
//!
//! [`spawn_observer`] binds eagerly so the caller sees a port conflict as
//! an error, then serves on a background Tokio task.
//!
//! # Usage
//!
//! ```rust,ignore
//! use wave_observer::startup::spawn_observer;
//!
//! let (handle, addr) = spawn_observer(&server_config, state, shutdown).await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;
use wave_core::schedule::Shutdown;

use crate::server::{self, ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the API server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Bind the API server and serve it on a background task.
///
/// Returns the task handle and the bound address. The task ends after
/// `shutdown` fires and in-flight requests complete.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the listener cannot bind.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: Arc<Shutdown>,
) -> Result<(JoinHandle<()>, SocketAddr), StartupError> {
    let listener = server::bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("local address unavailable: {e}")))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state, shutdown).await {
            tracing::error!(error = %e, "API server exited with error");
        }
    });

    tracing::info!(%addr, "API server spawned on background task");

    Ok((handle, addr))
}
