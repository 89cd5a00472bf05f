//! Axum router construction for the API server.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// - `POST /api/event` -- file-change event ingestion
/// - `POST /api/error` -- error report ingestion
/// - `GET /api/config` -- tuned config plus hardware snapshot
/// - `GET /api/malla` -- mesh payload
///
/// CORS allows any origin so the dashboard can be served from elsewhere.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Ingestion
        .route("/api/event", post(handlers::receive_event))
        .route("/api/error", post(handlers::receive_error))
        // Read-only views
        .route("/api/config", get(handlers::get_config))
        .route("/api/malla", get(handlers::get_malla))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
