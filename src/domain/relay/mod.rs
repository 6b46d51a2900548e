//! Relay module - events that flow through rooms and the session lifecycle.

mod event;
mod session_state;

pub use event::{BroadcastMessage, InboundFrame, RoomEvent, WellKnownEvent};
pub use session_state::SessionState;
