//! WebSocket-backed [`Connection`].
//!
//! Owns the write half of an upgraded socket. The read half stays with the
//! session loop; the two meet only through the `closed` signal, which lets
//! an eviction by the dispatcher end the session's read loop.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use futures::stream::SplitSink;
use futures::SinkExt;
use tokio::sync::{watch, Mutex};
use tokio::time;

use crate::domain::foundation::ConnectionId;
use crate::ports::{Connection, ConnectionError};

/// Upper bound on flushing a close frame to a peer that may be gone.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

type Sink = SplitSink<WebSocket, Message>;

/// Write half of one client socket.
pub struct WsConnection {
    id: ConnectionId,
    sink: Mutex<Sink>,
    closed: watch::Sender<bool>,
}

impl WsConnection {
    pub fn new(id: ConnectionId, sink: Sink) -> Arc<Self> {
        let (closed, _) = watch::channel(false);
        Arc::new(Self {
            id,
            sink: Mutex::new(sink),
            closed,
        })
    }

    /// Receiver that flips to `true` once [`Connection::close`] has been called.
    pub fn closed_signal(&self) -> watch::Receiver<bool> {
        self.closed.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Send a protocol-level ping, giving up after `deadline`.
    pub async fn ping(&self, deadline: Duration) -> Result<(), ConnectionError> {
        time::timeout(deadline, self.write_frame(Message::Ping(Vec::new())))
            .await
            .map_err(|_| ConnectionError::Timeout)?
    }

    async fn write_frame(&self, frame: Message) -> Result<(), ConnectionError> {
        if self.is_closed() {
            return Err(ConnectionError::Closed);
        }

        let mut sink = self.sink.lock().await;
        sink.send(frame)
            .await
            .map_err(|e| ConnectionError::Transport(e.to_string()))
    }
}

/// Text frame for UTF-8 payloads, binary otherwise.
fn frame_for(payload: Bytes) -> Message {
    match String::from_utf8(payload.to_vec()) {
        Ok(text) => Message::Text(text),
        Err(e) => Message::Binary(e.into_bytes()),
    }
}

#[async_trait]
impl Connection for WsConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn send(&self, payload: Bytes) -> Result<(), ConnectionError> {
        self.write_frame(frame_for(payload)).await
    }

    async fn close(&self) {
        if self.closed.send_replace(true) {
            return;
        }

        let flushed = time::timeout(CLOSE_TIMEOUT, async {
            let mut sink = self.sink.lock().await;
            sink.close().await
        })
        .await;

        match flushed {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::trace!(connection_id = %self.id, "Close error: {}", e),
            Err(_) => tracing::trace!(connection_id = %self.id, "Close timed out"),
        }
    }
}
