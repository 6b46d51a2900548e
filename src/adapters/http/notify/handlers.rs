//! HTTP handlers for the notify endpoint.
//!
//! External services inject a structured event into a room without holding
//! a socket. The handler never waits on the dispatcher: a saturated queue
//! answers `503` immediately so the caller can retry.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::adapters::http::{AppState, ErrorResponse};
use crate::adapters::websocket::DispatchError;
use crate::domain::foundation::RoomName;

use super::dto::{NotifyOverrides, NotifyResponse};

/// Query parameters accepted by `/notify`.
#[derive(Debug, Default, Deserialize)]
pub struct NotifyParams {
    pub room: Option<String>,
}

/// Room named by the path segment, else the `room` query parameter, else `general`.
pub fn target_room(segment: Option<&str>, query: Option<&str>) -> RoomName {
    let named = segment
        .filter(|s| !s.is_empty())
        .or_else(|| query.filter(|q| !q.is_empty()));
    RoomName::or_default(named)
}

/// `POST /notify[/{room}]`
pub async fn notify(
    State(state): State<AppState>,
    path: Option<Path<HashMap<String, String>>>,
    params: Option<Query<NotifyParams>>,
    body: Bytes,
) -> Response {
    let segment = path.as_ref().and_then(|Path(p)| p.get("room")).map(String::as_str);
    let query = params.as_ref().and_then(|Query(p)| p.room.as_deref());
    let room = target_room(segment, query);

    let event = NotifyOverrides::parse(&body).into_event();
    let payload = match event.to_payload() {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("Failed to encode notification: {}", e);
            return ErrorResponse::internal("Failed to encode notification")
                .with_status(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    match state.relay.dispatcher.enqueue(room.clone(), payload) {
        Ok(()) => {
            tracing::info!(room = %room, event = %event.event, "Notification queued");
            (StatusCode::OK, Json(NotifyResponse::ok(room.as_str()))).into_response()
        }
        Err(DispatchError::QueueFull) => {
            ErrorResponse::queue_full().with_status(StatusCode::SERVICE_UNAVAILABLE)
        }
        Err(DispatchError::Closed) => {
            ErrorResponse::unavailable().with_status(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Any method other than `POST` on a notify route.
pub async fn method_not_allowed() -> Response {
    ErrorResponse::method_not_allowed().with_status(StatusCode::METHOD_NOT_ALLOWED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segment_wins_over_query() {
        assert_eq!(target_room(Some("ops"), Some("other")), RoomName::new("ops"));
    }

    #[test]
    fn query_used_without_segment() {
        assert_eq!(target_room(None, Some("ops")), RoomName::new("ops"));
        assert_eq!(target_room(Some(""), Some("ops")), RoomName::new("ops"));
    }

    #[test]
    fn defaults_to_general() {
        assert_eq!(target_room(None, None), RoomName::general());
        assert_eq!(target_room(None, Some("")), RoomName::general());
    }
}
