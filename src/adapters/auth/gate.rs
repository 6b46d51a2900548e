//! Connection admission policy.

use std::sync::Arc;

use crate::domain::foundation::{AuthError, Principal};
use crate::ports::TokenValidator;

/// Decides whether a connection attempt may proceed.
///
/// `Open` admits everyone as an anonymous principal and must be chosen
/// explicitly in configuration. `Required` demands a credential that the
/// validator accepts.
#[derive(Clone)]
pub enum AuthGate {
    Open,
    Required(Arc<dyn TokenValidator>),
}

impl AuthGate {
    pub fn required(validator: Arc<dyn TokenValidator>) -> Self {
        AuthGate::Required(validator)
    }

    pub fn is_open(&self) -> bool {
        matches!(self, AuthGate::Open)
    }

    /// Admit or reject a connection presenting `token`.
    ///
    /// A blank token counts as missing.
    pub async fn authorize(&self, token: Option<&str>) -> Result<Principal, AuthError> {
        match self {
            AuthGate::Open => Ok(Principal::anonymous()),
            AuthGate::Required(validator) => {
                let token = token
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .ok_or(AuthError::MissingCredential)?;
                validator.validate(token).await
            }
        }
    }
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthGate::Open => write!(f, "AuthGate::Open"),
            AuthGate::Required(_) => write!(f, "AuthGate::Required"),
        }
    }
}
