//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the relay core and the outside world. Adapters implement these ports.
//!
//! - `Connection` - Writable handle to one connected client
//! - `TokenValidator` - Verifies connection credentials
//! - `RevocationSource` - Fetches the authority's revoked token ids

mod connection;
mod revocation_source;
mod token_validator;

pub use connection::{Connection, ConnectionError};
pub use revocation_source::{RevocationError, RevocationSource};
pub use token_validator::TokenValidator;
