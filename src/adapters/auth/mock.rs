//! Test doubles for the auth ports.
//!
//! # Example
//!
//! ```ignore
//! use ws_notifier::adapters::auth::{MockTokenValidator, StaticRevocationSource};
//! use ws_notifier::domain::foundation::Principal;
//!
//! let validator = MockTokenValidator::new()
//!     .with_token("valid-token", Principal::new(Some("user-1".into()), None));
//!
//! let source = StaticRevocationSource::new(vec!["jti-1".to_string()]);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, Principal};
use crate::ports::{RevocationError, RevocationSource, TokenValidator};

/// Token validator backed by a fixed token → principal map.
///
/// Tokens not in the map return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockTokenValidator {
    tokens: RwLock<HashMap<String, Principal>>,
    force_error: RwLock<Option<AuthError>>,
}

impl MockTokenValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token that validates to `principal`.
    pub fn with_token(self, token: impl Into<String>, principal: Principal) -> Self {
        self.tokens
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(token.into(), principal);
        self
    }

    /// Adds a token for a subject with no `jti`.
    pub fn with_subject(self, token: impl Into<String>, subject: impl Into<String>) -> Self {
        self.with_token(token, Principal::new(Some(subject.into()), None))
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self.force_error.write().unwrap_or_else(|e| e.into_inner()) = Some(error);
        self
    }
}

#[async_trait]
impl TokenValidator for MockTokenValidator {
    async fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        if let Some(error) = self
            .force_error
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Err(error);
        }

        self.tokens
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

/// Revocation source that serves an in-memory list.
///
/// The list and a forced error can be changed at runtime to drive refresh tests.
#[derive(Debug, Default)]
pub struct StaticRevocationSource {
    ids: RwLock<Vec<String>>,
    force_error: RwLock<Option<RevocationError>>,
    fetches: AtomicUsize,
}

impl StaticRevocationSource {
    pub fn new(ids: Vec<String>) -> Self {
        Self {
            ids: RwLock::new(ids),
            ..Self::default()
        }
    }

    /// Replace the served list and clear any forced error.
    pub fn set(&self, ids: Vec<String>) {
        *self.ids.write().unwrap_or_else(|e| e.into_inner()) = ids;
        *self.force_error.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Make every fetch fail until [`set`](Self::set) is called.
    pub fn fail_with(&self, error: RevocationError) {
        *self.force_error.write().unwrap_or_else(|e| e.into_inner()) = Some(error);
    }

    /// Number of fetches served so far, including failed ones.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RevocationSource for StaticRevocationSource {
    async fn fetch_revoked(&self) -> Result<Vec<String>, RevocationError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self
            .force_error
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Err(error);
        }

        Ok(self.ids.read().unwrap_or_else(|e| e.into_inner()).clone())
    }
}
