//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, auth outcomes and the state machine trait that
//! form the vocabulary of the relay.

mod auth;
mod ids;
mod state_machine;

pub use auth::{AuthError, Principal};
pub use ids::{ConnectionId, RoomName};
pub use state_machine::{InvalidTransition, StateMachine};
