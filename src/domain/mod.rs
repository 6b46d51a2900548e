//! Domain layer containing the relay's core types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (identifiers, auth outcomes, state machine trait)
//! - `relay` - Room events, broadcast messages and the connection session lifecycle

pub mod foundation;
pub mod relay;
