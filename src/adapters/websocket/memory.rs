//! In-memory connection for tests.
//!
//! Records every frame written to it and can be switched into failing or
//! stalled modes to exercise the dispatcher's eviction path without a
//! real socket.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Notify;

use crate::domain::foundation::ConnectionId;
use crate::ports::{Connection, ConnectionError};

/// How an [`InMemoryConnection`] responds to writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteBehavior {
    /// Record the frame and succeed.
    Accept,
    /// Fail immediately with a transport error.
    Fail,
    /// Never complete, so only a write deadline can end the call.
    Stall,
}

/// Connection double that records frames in memory.
pub struct InMemoryConnection {
    id: ConnectionId,
    frames: Mutex<Vec<Bytes>>,
    behavior: WriteBehavior,
    closed: AtomicBool,
    received: Notify,
}

impl InMemoryConnection {
    /// Creates a connection that accepts every write.
    pub fn new() -> Arc<Self> {
        Self::with_behavior(WriteBehavior::Accept)
    }

    /// Creates a connection whose writes fail.
    pub fn failing() -> Arc<Self> {
        Self::with_behavior(WriteBehavior::Fail)
    }

    /// Creates a connection whose writes never complete.
    pub fn stalled() -> Arc<Self> {
        Self::with_behavior(WriteBehavior::Stall)
    }

    pub fn with_behavior(behavior: WriteBehavior) -> Arc<Self> {
        Arc::new(Self {
            id: ConnectionId::new(),
            frames: Mutex::new(Vec::new()),
            behavior,
            closed: AtomicBool::new(false),
            received: Notify::new(),
        })
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Frames received so far, in arrival order.
    pub fn frames(&self) -> Vec<Bytes> {
        self.frames.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Waits until at least `count` frames have been recorded.
    pub async fn wait_for_frames(&self, count: usize) -> Vec<Bytes> {
        loop {
            let notified = self.received.notified();
            let frames = self.frames();
            if frames.len() >= count {
                return frames;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl Connection for InMemoryConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn send(&self, payload: Bytes) -> Result<(), ConnectionError> {
        if self.is_closed() {
            return Err(ConnectionError::Closed);
        }

        match self.behavior {
            WriteBehavior::Accept => {
                self.frames
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(payload);
                self.received.notify_waiters();
                Ok(())
            }
            WriteBehavior::Fail => Err(ConnectionError::Transport("simulated failure".to_string())),
            WriteBehavior::Stall => std::future::pending().await,
        }
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
