//! Adapters - Implementations of port interfaces.
//!
//! - `auth` - Token validation, revocation cache and its refresher
//! - `http` - Router, notify ingress, health and CORS
//! - `websocket` - Rooms, dispatcher, sessions and the upgrade handler

pub mod auth;
pub mod http;
pub mod websocket;
