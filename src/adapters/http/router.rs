//! Top-level router: assembles every endpoint and the shared layers.
//!
//! # Routes
//! - `GET /` - health (also the fallback for unmatched paths)
//! - `GET /stats` - room and connection counts
//! - `GET /ws` - WebSocket upgrade
//! - `POST /notify[/{room}]` - inject a notification
//!
//! # Layers (outermost first)
//! - `cors_headers` - `OPTIONS` → 204, full CORS header set
//! - `TraceLayer` - request spans

use axum::{extract::FromRef, middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::adapters::websocket::{ws_handler, WebSocketState};

use super::health::{health, stats};
use super::middleware::cors_headers;
use super::notify::notify_routes;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub relay: WebSocketState,
}

impl AppState {
    pub fn new(relay: WebSocketState) -> Self {
        Self { relay }
    }
}

impl FromRef<AppState> for WebSocketState {
    fn from_ref(state: &AppState) -> Self {
        state.relay.clone()
    }
}

/// Build the complete application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/stats", get(stats))
        .route("/ws", get(ws_handler))
        .merge(notify_routes())
        .fallback(health)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(cors_headers))
}
