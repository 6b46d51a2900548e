//! HMAC JWT validator.
//!
//! Validates bearer tokens signed with a shared secret (HS256, HS384 or
//! HS512) and rejects tokens whose `jti` appears in the revocation cache.
//!
//! # Security
//!
//! - Only the HMAC family is accepted; the header's `alg` is checked before
//!   any signature work, so an asymmetric or `none` token never reaches the
//!   verifier.
//! - `exp` and `nbf` are enforced when present, with no leeway.
//! - No audience or issuer is required; the shared secret is the trust anchor.

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::foundation::{AuthError, Principal};
use crate::ports::TokenValidator;

use super::revocation::RevocationCache;

const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Claims the relay reads. Other claims are ignored.
///
/// Non-string values are tolerated and treated as absent.
#[derive(Debug, Deserialize)]
struct RelayClaims {
    #[serde(default)]
    sub: Option<Value>,
    #[serde(default)]
    jti: Option<Value>,
}

fn string_claim(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Validates HMAC-signed JWTs against a shared secret.
pub struct HmacTokenValidator {
    key: DecodingKey,
    validation: Validation,
    revocations: Arc<RevocationCache>,
}

impl HmacTokenValidator {
    pub fn new(secret: &SecretString, revocations: Arc<RevocationCache>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        validation.validate_aud = false;
        validation.validate_nbf = true;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
            revocations,
        }
    }
}

impl std::fmt::Debug for HmacTokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacTokenValidator")
            .field("key", &"[REDACTED]")
            .field("algorithms", &self.validation.algorithms)
            .finish()
    }
}

#[async_trait]
impl TokenValidator for HmacTokenValidator {
    async fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!("Failed to decode JWT header: {}", e);
            AuthError::InvalidToken
        })?;

        if !HMAC_ALGORITHMS.contains(&header.alg) {
            tracing::warn!("Unsupported algorithm: {:?}", header.alg);
            return Err(AuthError::UnsupportedAlgorithm(format!("{:?}", header.alg)));
        }

        let data = decode::<RelayClaims>(token, &self.key, &self.validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                ErrorKind::InvalidSignature => {
                    tracing::warn!("Token signature mismatch");
                    AuthError::InvalidToken
                }
                _ => {
                    tracing::warn!("Token validation failed: {}", e);
                    AuthError::InvalidToken
                }
            }
        })?;

        let principal = Principal::new(string_claim(data.claims.sub), string_claim(data.claims.jti));

        if let Some(jti) = principal.token_id.as_deref() {
            if self.revocations.is_revoked(jti).await {
                tracing::info!(jti, "Rejected revoked token");
                return Err(AuthError::Revoked);
            }
        }

        Ok(principal)
    }
}
