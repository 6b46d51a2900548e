//! Token validation port for connection credentials.
//!
//! This port defines the contract for verifying a bearer credential and
//! extracting the identity it carries. The HMAC JWT adapter is the
//! production implementation; tests use a token-table mock.
//!
//! # Security Requirements
//!
//! All implementations MUST:
//! - Verify the signature with the configured shared secret
//! - Reject credentials signed with an algorithm outside the expected family
//! - Reject credentials whose `jti` is in the current revocation snapshot

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, Principal};

/// Validates bearer credentials presented at connection time.
///
/// # Contract
///
/// Implementations must:
/// - Return `AuthError::InvalidToken` for malformed tokens or bad signatures
/// - Return `AuthError::UnsupportedAlgorithm` for non-HMAC algorithms
/// - Return `AuthError::Revoked` when the token id has been revoked
/// - Never block on network I/O (revocations are read from a local cache)
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Validate a raw token (without the `Bearer ` prefix).
    async fn validate(&self, token: &str) -> Result<Principal, AuthError>;
}
