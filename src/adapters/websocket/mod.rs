//! WebSocket adapters for room-based notification fan-out.
//!
//! # Architecture
//!
//! ```text
//!   client ──ws──► handler ──► Session ─┐            ┌──► WsConnection (room: ops)
//!                  (origin, auth)       │            │
//!   POST /notify ───────────────────────┼─► Dispatcher ─► WsConnection (room: ops)
//!                                       │  (bounded)  │
//!   client ──ws──► handler ──► Session ─┘            └──► WsConnection (room: general)
//!                                                          ▲
//!                                   RoomRegistry ──────────┘ (snapshot per message)
//! ```
//!
//! # Components
//!
//! - [`rooms`] - Room registry mapping names to live connections
//! - [`dispatcher`] - Bounded broadcast queue and its single fan-out worker
//! - [`session`] - Per-connection read loop and keepalive
//! - [`handler`] - Axum upgrade handler with origin and auth checks
//! - [`connection`] - Socket-backed `Connection`
//! - [`memory`] - In-memory `Connection` for tests

pub mod connection;
pub mod dispatcher;
pub mod handler;
pub mod memory;
pub mod origin;
pub mod rooms;
pub mod session;

pub use connection::WsConnection;
pub use dispatcher::{
    dispatcher, DispatchError, DispatchWorker, Dispatcher, DispatcherConfig,
    DEFAULT_QUEUE_CAPACITY, DEFAULT_WRITE_TIMEOUT,
};
pub use handler::{bearer_token, websocket_router, ws_handler, ConnectParams, WebSocketState};
pub use memory::{InMemoryConnection, WriteBehavior};
pub use origin::OriginPolicy;
pub use rooms::RoomRegistry;
pub use session::{Session, SessionConfig, MAX_MESSAGE_SIZE, PING_INTERVAL, READ_DEADLINE};
