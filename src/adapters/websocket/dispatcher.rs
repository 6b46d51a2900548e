//! Broadcast dispatcher - single bounded queue, single fan-out worker.
//!
//! Producers (connection sessions and the HTTP notify endpoint) enqueue
//! `(room, payload)` pairs without ever blocking. One worker drains the
//! queue in order and writes each message to a snapshot of the room.
//!
//! # Flow
//!
//! ```text
//! session ─┐                          ┌─► conn-a
//! notify  ─┼─► [ bounded queue ] ─► worker ─► conn-b
//! session ─┘       (drop when full)   └─► conn-c ✗ ─► eviction task
//! ```
//!
//! ## Load shedding
//!
//! A full queue drops the message and logs it. Sessions ignore the drop;
//! the notify endpoint turns it into `503 Service Unavailable`.
//!
//! ## Ordering
//!
//! One queue and one worker give global FIFO: if M1 is enqueued before M2,
//! every member of the room receives M1 before M2.
//!
//! ## Eviction
//!
//! A failed or timed-out write hands the connection to an eviction task
//! that removes it from every room and closes it, so the worker moves on
//! to the next message immediately. The eviction task is owned by the
//! worker and joined when the worker stops.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;

use crate::domain::foundation::RoomName;
use crate::domain::relay::BroadcastMessage;
use crate::ports::Connection;

use super::rooms::RoomRegistry;

/// Default queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Default deadline for a single fan-out write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Maximum queued messages before new ones are dropped.
    pub queue_capacity: usize,

    /// Deadline for writing one message to one connection.
    pub write_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

impl DispatcherConfig {
    /// Create config with custom queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Create config with custom write timeout.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

/// Errors returned to producers by [`Dispatcher::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The queue is saturated; the message was dropped.
    #[error("Dispatch queue is full")]
    QueueFull,

    /// The worker has stopped; the message was dropped.
    #[error("Dispatcher is not running")]
    Closed,
}

/// Producer handle to the broadcast queue. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::Sender<BroadcastMessage>,
}

impl Dispatcher {
    /// Queue a payload for every member of `room`.
    ///
    /// Never blocks. When the queue is full the message is dropped, the
    /// drop is logged, and `DispatchError::QueueFull` is returned so callers
    /// that care (the notify endpoint) can report it.
    pub fn enqueue(&self, room: RoomName, payload: Bytes) -> Result<(), DispatchError> {
        match self.tx.try_send(BroadcastMessage::new(room, payload)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(dropped)) => {
                tracing::warn!(room = %dropped.room, "Dispatch queue full, dropping message");
                Err(DispatchError::QueueFull)
            }
            Err(TrySendError::Closed(dropped)) => {
                tracing::warn!(room = %dropped.room, "Dispatcher stopped, dropping message");
                Err(DispatchError::Closed)
            }
        }
    }

    /// Configured queue capacity.
    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

/// Create a dispatcher handle and the worker that drains it.
pub fn dispatcher(registry: Arc<RoomRegistry>, config: DispatcherConfig) -> (Dispatcher, DispatchWorker) {
    let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
    let worker = DispatchWorker {
        rx,
        fanout: Fanout {
            registry,
            write_timeout: config.write_timeout,
        },
    };
    (Dispatcher { tx }, worker)
}

/// The single consumer of the broadcast queue.
pub struct DispatchWorker {
    rx: mpsc::Receiver<BroadcastMessage>,
    fanout: Fanout,
}

impl DispatchWorker {
    /// Run until shutdown is signalled or every producer handle is dropped.
    ///
    /// Returns after the eviction task has drained, so no cleanup work
    /// outlives the worker.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let Self { mut rx, fanout } = self;
        let (evict_tx, evict_rx) = mpsc::unbounded_channel();
        let evictions = spawn_evictions(fanout.registry.clone(), evict_rx);

        tracing::debug!("Dispatch worker started");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }

                next = rx.recv() => {
                    match next {
                        Some(message) => {
                            fanout.deliver(&message, &evict_tx).await;
                        }
                        None => break,
                    }
                }
            }
        }

        drop(evict_tx);
        if let Err(e) = evictions.await {
            tracing::error!("Eviction task failed: {}", e);
        }

        tracing::debug!("Dispatch worker stopped");
    }
}

struct Fanout {
    registry: Arc<RoomRegistry>,
    write_timeout: Duration,
}

impl Fanout {
    /// Write one message to a snapshot of its room. Returns the delivery count.
    async fn deliver(
        &self,
        message: &BroadcastMessage,
        evictions: &mpsc::UnboundedSender<Arc<dyn Connection>>,
    ) -> usize {
        let targets = self.registry.snapshot(&message.room).await;
        let mut delivered = 0;

        for conn in targets {
            match time::timeout(self.write_timeout, conn.send(message.payload.clone())).await {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    tracing::debug!(connection_id = %conn.id(), room = %message.room, "Write error: {}", e);
                    let _ = evictions.send(conn);
                }
                Err(_) => {
                    tracing::debug!(connection_id = %conn.id(), room = %message.room, "Write deadline exceeded");
                    let _ = evictions.send(conn);
                }
            }
        }

        tracing::trace!(room = %message.room, delivered, "Message dispatched");
        delivered
    }
}

fn spawn_evictions(
    registry: Arc<RoomRegistry>,
    mut rx: mpsc::UnboundedReceiver<Arc<dyn Connection>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(conn) = rx.recv().await {
            let rooms = registry.remove_everywhere(&conn.id()).await;
            conn.close().await;
            tracing::info!(connection_id = %conn.id(), rooms, "Evicted connection after failed write");
        }
    })
}
