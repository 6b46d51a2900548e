//! Connection port - a writable handle to one connected client.
//!
//! The room registry stores connections as `Arc<dyn Connection>` and the
//! dispatcher writes through this trait, so fan-out never depends on the
//! concrete transport. The WebSocket adapter is the production
//! implementation; tests use in-memory recorders.
//!
//! ## Ownership
//!
//! The connection session owns the socket. The registry only references
//! the handle for fan-out targeting; dropping a handle never closes the
//! underlying channel, [`Connection::close`] does.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::foundation::ConnectionId;

/// Errors that can occur while writing to a connection.
///
/// Every variant is fatal to that single connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// The channel was already closed.
    #[error("Connection closed")]
    Closed,

    /// The write did not complete before its deadline.
    #[error("Write deadline exceeded")]
    Timeout,

    /// The transport reported a failure.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// A bidirectional client channel, viewed from the write side.
///
/// # Contract
///
/// Implementations must:
/// - Return a stable [`ConnectionId`] for the lifetime of the connection
/// - Deliver frames passed to `send` in call order
/// - Make `close` idempotent; calls after the first are no-ops
/// - Return `ConnectionError::Closed` from `send` after `close`
#[async_trait]
pub trait Connection: Send + Sync {
    /// Identity used by the room registry.
    fn id(&self) -> ConnectionId;

    /// Write one frame to the client.
    async fn send(&self, payload: Bytes) -> Result<(), ConnectionError>;

    /// Close the underlying channel.
    async fn close(&self);
}
