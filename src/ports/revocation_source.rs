//! Revocation source port - the authority's list of invalidated token ids.
//!
//! The identity service publishes the identifiers (`jti`) of tokens that
//! must no longer be accepted. The relay polls this list on an interval and
//! keeps a local snapshot, so validation never waits on the network.

use async_trait::async_trait;

/// Errors that can occur while fetching the revocation list.
///
/// None of these are fatal: the caller keeps the previous snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RevocationError {
    /// The authority could not be reached.
    #[error("Revocation authority unavailable: {0}")]
    Unavailable(String),

    /// The authority answered with an error status.
    #[error("Revocation authority returned status {0}")]
    BadStatus(u16),

    /// The response body was not a revocation list.
    #[error("Malformed revocation list: {0}")]
    Malformed(String),
}

/// Fetches the authority's current set of revoked token identifiers.
#[async_trait]
pub trait RevocationSource: Send + Sync {
    /// Returns the complete current list; the caller replaces its snapshot wholesale.
    async fn fetch_revoked(&self) -> Result<Vec<String>, RevocationError>;
}
