//! Real-time room-based notification relay.
//!
//! Clients join a named room over WebSocket; messages posted to
//! `/notify/{room}` or sent by any room member are fanned out to every
//! connection in that room through a single bounded dispatch queue.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod server;
