//! Permissive CORS for the handshake and HTTP endpoints.
//!
//! Every response carries:
//!
//! ```text
//! Access-Control-Allow-Origin: *
//! Access-Control-Allow-Headers: Content-Type, Authorization
//! Access-Control-Allow-Methods: GET, POST, OPTIONS
//! ```
//!
//! and any `OPTIONS` request is answered `204 No Content` without reaching
//! a handler.

use axum::{body::Body, extract::Request, middleware::Next, response::Response};
use http::{header, HeaderValue, Method, StatusCode};

const ALLOW_HEADERS: &str = "Content-Type, Authorization";
const ALLOW_METHODS: &str = "GET, POST, OPTIONS";

/// Answers `OPTIONS` with `204` and completes the CORS header set on every
/// other response.
pub async fn cors_headers(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        let mut preflight = Response::new(Body::empty());
        *preflight.status_mut() = StatusCode::NO_CONTENT;
        preflight
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "hello" }).post(|| async { StatusCode::CREATED }))
            .layer(middleware::from_fn(cors_headers))
    }

    fn assert_cors(response: &Response) {
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], ALLOW_HEADERS);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], ALLOW_METHODS);
    }

    #[tokio::test]
    async fn handler_responses_get_full_header_set() {
        let response = app()
            .oneshot(
                http::Request::builder()
                    .method(Method::POST)
                    .uri("/")
                    .header(header::ORIGIN, "https://app.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn options_short_circuits_with_no_content() {
        let response = app()
            .oneshot(
                http::Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/no-such-route")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_cors(&response);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }
}
