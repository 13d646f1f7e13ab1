//! Axum router construction for the observer server.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled so browser-based visualization clients
//! can talk to the API from another origin.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the observer server.
///
/// The router includes:
/// - `GET /` -- service status
/// - `GET /ws` -- frame stream + control channel
/// - `POST /api/init` -- (re-)initialize the simulation
/// - `POST /api/step` -- advance one tick
/// - `POST /api/params` -- mid-run parameter injection
/// - `GET /api/frame` -- latest frame
///
/// CORS allows any origin for development; restrict it in production.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws", get(ws::ws_stream))
        // REST API
        .route("/api/init", post(handlers::init))
        .route("/api/step", post(handlers::step))
        .route("/api/params", post(handlers::set_params))
        .route("/api/frame", get(handlers::get_frame))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
