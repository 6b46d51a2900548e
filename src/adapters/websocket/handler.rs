//! WebSocket upgrade handler.
//!
//! Admits a connection in three steps, each able to reject it before the
//! protocol switch:
//! 1. Origin must be on the allow-list (403)
//! 2. Credential must pass the auth gate (401)
//! 3. Request must be a valid upgrade
//!
//! The admitted socket is handed to a [`Session`] for the named room.
//!
//! Route: `GET /ws?room=<name>[&token=<jwt>]`

use std::sync::Arc;

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, WebSocketUpgrade},
        Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tokio::sync::watch;

use crate::adapters::auth::AuthGate;
use crate::adapters::http::ErrorResponse;
use crate::domain::foundation::RoomName;

use super::dispatcher::Dispatcher;
use super::origin::OriginPolicy;
use super::rooms::RoomRegistry;
use super::session::{Session, SessionConfig, MAX_MESSAGE_SIZE};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub registry: Arc<RoomRegistry>,
    pub dispatcher: Dispatcher,
    pub auth: AuthGate,
    pub origins: OriginPolicy,
    pub session: SessionConfig,
    pub shutdown: watch::Receiver<bool>,
}

/// Query parameters accepted on the upgrade request.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    pub room: Option<String>,
    pub token: Option<String>,
}

/// Bearer token from the `Authorization` header. The scheme is case-insensitive.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Handle WebSocket upgrade requests.
pub async fn ws_handler(
    State(state): State<WebSocketState>,
    headers: HeaderMap,
    params: Option<Query<ConnectParams>>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let params = params.map(|Query(p)| p).unwrap_or_default();

    let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());
    if !state.origins.allows(origin) {
        tracing::warn!(origin = origin.unwrap_or("<none>"), "Rejected upgrade from disallowed origin");
        return ErrorResponse::forbidden_origin().with_status(StatusCode::FORBIDDEN);
    }

    let token = bearer_token(&headers).or(params.token.as_deref());
    let principal = match state.auth.authorize(token).await {
        Ok(principal) => principal,
        Err(e) => {
            tracing::info!(code = e.code(), "Rejected upgrade: {}", e);
            return ErrorResponse::new(e.code(), e.to_string()).with_status(StatusCode::UNAUTHORIZED);
        }
    };

    let ws = match upgrade {
        Ok(ws) => ws,
        Err(rejection) => {
            tracing::debug!("Upgrade rejected: {}", rejection);
            return rejection.into_response();
        }
    };

    let room = RoomName::or_default(params.room.as_deref());
    let session = Session::new(
        room,
        principal,
        state.registry.clone(),
        state.dispatcher.clone(),
        state.session.clone(),
    );
    let shutdown = state.shutdown.clone();

    ws.max_message_size(MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| session.run(socket, shutdown))
}

/// Router exposing the upgrade endpoint at `/ws`.
pub fn websocket_router(state: WebSocketState) -> Router {
    Router::new().route("/ws", get(ws_handler)).with_state(state)
}
