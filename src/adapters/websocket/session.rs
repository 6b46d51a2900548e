//! Per-connection session: registration, read loop, keepalive, teardown.
//!
//! A session starts once the upgrade handler has admitted the client. It
//! registers the connection in its room, relays every inbound frame to the
//! dispatcher, and keeps the socket alive with periodic pings. Any read
//! error, close frame, missed pong, eviction or server shutdown ends it.
//!
//! # Liveness
//!
//! ```text
//! t=0      read deadline = 60s
//! t=30s    ping ──►
//! t=30.1s       ◄── pong   read deadline = 90.1s
//! t=60s    ping ──►
//!               (no pong)
//! t=90.1s  deadline passes → Closing
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::watch;
use tokio::time::{self, Instant};

use crate::domain::foundation::{ConnectionId, Principal, RoomName, StateMachine};
use crate::domain::relay::{InboundFrame, SessionState};
use crate::ports::Connection;

use super::connection::WsConnection;
use super::dispatcher::Dispatcher;
use super::rooms::RoomRegistry;

/// Interval between server pings.
pub const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Time without a pong before the connection is considered dead.
pub const READ_DEADLINE: Duration = Duration::from_secs(60);

/// Deadline for writing a single ping.
pub const PING_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest inbound message accepted from a client.
pub const MAX_MESSAGE_SIZE: usize = 1 << 20;

/// Keepalive timings for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ping_interval: Duration,
    pub read_deadline: Duration,
    pub ping_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ping_interval: PING_INTERVAL,
            read_deadline: READ_DEADLINE,
            ping_timeout: PING_WRITE_TIMEOUT,
        }
    }
}

impl SessionConfig {
    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    pub fn with_read_deadline(mut self, deadline: Duration) -> Self {
        self.read_deadline = deadline;
        self
    }
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CloseReason {
    ClientClosed,
    StreamEnded,
    ReadTimeout,
    ReadError(String),
    Evicted,
    Shutdown,
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseReason::ClientClosed => write!(f, "client closed"),
            CloseReason::StreamEnded => write!(f, "stream ended"),
            CloseReason::ReadTimeout => write!(f, "read deadline exceeded"),
            CloseReason::ReadError(e) => write!(f, "read error: {}", e),
            CloseReason::Evicted => write!(f, "evicted"),
            CloseReason::Shutdown => write!(f, "server shutdown"),
        }
    }
}

/// One admitted client connection.
pub struct Session {
    id: ConnectionId,
    room: RoomName,
    principal: Principal,
    state: SessionState,
    registry: Arc<RoomRegistry>,
    dispatcher: Dispatcher,
    config: SessionConfig,
}

impl Session {
    pub fn new(
        room: RoomName,
        principal: Principal,
        registry: Arc<RoomRegistry>,
        dispatcher: Dispatcher,
        config: SessionConfig,
    ) -> Self {
        Self {
            id: ConnectionId::new(),
            room,
            principal,
            state: SessionState::Connecting,
            registry,
            dispatcher,
            config,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drive the connection until it ends. Always leaves the room before returning.
    pub async fn run(mut self, socket: WebSocket, mut shutdown: watch::Receiver<bool>) {
        self.advance(SessionState::Authenticated);

        let (sink, mut stream) = socket.split();
        let conn = WsConnection::new(self.id, sink);
        self.registry.join(&self.room, conn.clone()).await;
        self.advance(SessionState::Active);

        let members = self.registry.client_count(&self.room).await;
        let total = self.registry.total_client_count().await;
        tracing::info!(
            connection_id = %self.id,
            room = %self.room,
            members,
            total,
            subject = self.principal.subject.as_deref().unwrap_or("anonymous"),
            "Client connected"
        );

        let (stop_keepalive, stop_rx) = watch::channel(false);
        let keepalive = tokio::spawn(keepalive(conn.clone(), self.config.clone(), stop_rx));
        let mut closed = conn.closed_signal();
        let mut read_deadline = Instant::now() + self.config.read_deadline;

        let reason = loop {
            tokio::select! {
                next = time::timeout_at(read_deadline, stream.next()) => {
                    match next {
                        Err(_) => break CloseReason::ReadTimeout,
                        Ok(None) => break CloseReason::StreamEnded,
                        Ok(Some(Err(e))) => break CloseReason::ReadError(e.to_string()),
                        Ok(Some(Ok(message))) => match message {
                            Message::Text(text) => self.relay(Bytes::from(text)),
                            Message::Binary(data) => self.relay(Bytes::from(data)),
                            Message::Pong(_) => {
                                read_deadline = Instant::now() + self.config.read_deadline;
                            }
                            // Answered by the websocket layer.
                            Message::Ping(_) => {}
                            Message::Close(_) => break CloseReason::ClientClosed,
                        },
                    }
                }

                _ = signalled(&mut closed) => break CloseReason::Evicted,

                _ = signalled(&mut shutdown) => break CloseReason::Shutdown,
            }
        };

        self.advance(SessionState::Closing);

        let _ = stop_keepalive.send(true);
        if let Err(e) = keepalive.await {
            tracing::warn!(connection_id = %self.id, "Keepalive task failed: {}", e);
        }
        conn.close().await;
        self.registry.leave(&self.room, &self.id).await;

        self.advance(SessionState::Closed);
        let members = self.registry.client_count(&self.room).await;
        let total = self.registry.total_client_count().await;
        tracing::info!(
            connection_id = %self.id,
            room = %self.room,
            members,
            total,
            reason = %reason,
            "Client disconnected"
        );
    }

    /// Hand one client frame to the dispatcher for the session's room.
    fn relay(&self, payload: Bytes) {
        let payload = match InboundFrame::classify(payload).into_payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(connection_id = %self.id, "Failed to encode event: {}", e);
                return;
            }
        };

        // A full queue is already logged by the dispatcher; the sender is not told.
        let _ = self.dispatcher.enqueue(self.room.clone(), payload);
    }

    fn advance(&mut self, next: SessionState) {
        match self.state.transition_to(next) {
            Ok(state) => {
                tracing::debug!(
                    connection_id = %self.id,
                    from = ?self.state,
                    to = ?state,
                    "Session state changed"
                );
                self.state = state;
            }
            Err(e) => {
                tracing::warn!(connection_id = %self.id, "Rejected session transition: {}", e);
            }
        }
    }
}

/// Resolves once the flag is `true`. A dropped sender never resolves.
async fn signalled(flag: &mut watch::Receiver<bool>) {
    if flag.wait_for(|set| *set).await.is_err() {
        std::future::pending::<()>().await;
    }
}

async fn keepalive(conn: Arc<WsConnection>, config: SessionConfig, mut stop: watch::Receiver<bool>) {
    let mut ticker = time::interval_at(Instant::now() + config.ping_interval, config.ping_interval);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = conn.ping(config.ping_timeout).await {
                    tracing::debug!(connection_id = %conn.id(), "Ping failed: {}", e);
                }
            }
            _ = signalled(&mut stop) => break,
        }
    }
}
