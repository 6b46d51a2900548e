//! HTTP middleware for axum.
//!
//! - `cors` - Permissive CORS headers and `OPTIONS` short-circuit

pub mod cors;

pub use cors::cors_headers;
