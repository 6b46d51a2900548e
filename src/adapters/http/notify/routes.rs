//! Routes for the notify endpoint.

use axum::{routing::post, Router};

use crate::adapters::http::AppState;

use super::handlers::{method_not_allowed, notify};

/// Create the notify router.
///
/// # Routes
/// - `POST /notify` - room from `?room=`, default `general`
/// - `POST /notify/{room}` - room from the first path segment; deeper
///   segments are ignored
///
/// Other methods answer `405`.
pub fn notify_routes() -> Router<AppState> {
    let handler = || post(notify).fallback(method_not_allowed);

    Router::new()
        .route("/notify", handler())
        .route("/notify/", handler())
        .route("/notify/:room", handler())
        .route("/notify/:room/", handler())
        .route("/notify/:room/*rest", handler())
}
