//! JSON error bodies shared by every endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Standard error response: `{"error": "...", "code": "..."}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }

    pub fn forbidden_origin() -> Self {
        Self::new("ORIGIN_NOT_ALLOWED", "Origin not allowed")
    }

    pub fn queue_full() -> Self {
        Self::new("QUEUE_FULL", "Notification queue is full")
    }

    pub fn unavailable() -> Self {
        Self::new("SERVICE_UNAVAILABLE", "Notification service is not running")
    }

    pub fn method_not_allowed() -> Self {
        Self::new("METHOD_NOT_ALLOWED", "Method not allowed")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    /// Pair with a status code to build a response.
    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_error_and_code() {
        let body = serde_json::to_value(ErrorResponse::queue_full()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"error": "Notification queue is full", "code": "QUEUE_FULL"})
        );
    }

    #[test]
    fn with_status_sets_status_code() {
        let response = ErrorResponse::method_not_allowed().with_status(StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
