//! Authentication types for the domain layer.
//!
//! These types describe the outcome of validating a connection credential.
//! They have **no external dependencies** - the JWT adapter populates them
//! via the `TokenValidator` port.

use thiserror::Error;

/// Identity admitted to open a connection.
///
/// In open mode every connection is admitted as [`Principal::anonymous`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    /// Subject claim (`sub`) when the credential carried one.
    pub subject: Option<String>,

    /// Token identifier claim (`jti`), the key checked against revocations.
    pub token_id: Option<String>,
}

impl Principal {
    /// Creates a principal from validated claims.
    pub fn new(subject: Option<String>, token_id: Option<String>) -> Self {
        Self { subject, token_id }
    }

    /// Principal used when authentication is disabled.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Returns true if no credential backed this principal.
    pub fn is_anonymous(&self) -> bool {
        self.subject.is_none() && self.token_id.is_none()
    }
}

/// Authentication errors raised while admitting a connection.
///
/// Every variant rejects the attempt before the protocol upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Authentication is required but no credential was supplied.
    #[error("Missing credential")]
    MissingCredential,

    /// The credential is malformed or its signature does not verify.
    #[error("Invalid token")]
    InvalidToken,

    /// The credential carries an `exp` in the past.
    #[error("Token expired")]
    TokenExpired,

    /// The credential was signed with an algorithm outside the HMAC family.
    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The credential's identifier is on the revocation list.
    #[error("Token revoked")]
    Revoked,
}

impl AuthError {
    /// Stable machine-readable code for HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "MISSING_CREDENTIAL",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::UnsupportedAlgorithm(_) => "UNSUPPORTED_ALGORITHM",
            AuthError::Revoked => "TOKEN_REVOKED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_principal_has_no_claims() {
        let principal = Principal::anonymous();
        assert!(principal.is_anonymous());
        assert_eq!(principal.token_id, None);
    }

    #[test]
    fn principal_with_claims_is_not_anonymous() {
        let principal = Principal::new(Some("user-1".to_string()), Some("jti-1".to_string()));
        assert!(!principal.is_anonymous());
    }

    #[test]
    fn auth_error_displays_correctly() {
        assert_eq!(AuthError::InvalidToken.to_string(), "Invalid token");
        assert_eq!(AuthError::Revoked.to_string(), "Token revoked");
        assert_eq!(
            AuthError::UnsupportedAlgorithm("RS256".to_string()).to_string(),
            "Unsupported signing algorithm: RS256"
        );
    }

    #[test]
    fn auth_error_codes_are_distinct() {
        let codes = [
            AuthError::MissingCredential.code(),
            AuthError::InvalidToken.code(),
            AuthError::TokenExpired.code(),
            AuthError::UnsupportedAlgorithm(String::new()).code(),
            AuthError::Revoked.code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }
}
