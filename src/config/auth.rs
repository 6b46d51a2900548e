//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

use super::error::ValidationError;

/// Connection authentication and revocation sync settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Reject connections without a valid token
    #[serde(rename = "ws_require_auth", default)]
    pub require_auth: bool,

    /// Shared HMAC secret for token signatures
    #[serde(rename = "ws_jwt_secret", default)]
    pub jwt_secret: Option<SecretString>,

    /// Identity service base URL (serves `/auth/revoked`)
    #[serde(default = "default_auth_service_url")]
    pub auth_service_url: String,

    /// Revocation list refresh interval in seconds. Unparseable values fall
    /// back to the default; negative values clamp to zero (then to the floor).
    #[serde(
        default = "default_revoked_sync_seconds",
        deserialize_with = "lenient_seconds"
    )]
    pub revoked_sync_seconds: u64,
}

impl AuthConfig {
    /// Refresh interval as Duration (not yet floored; the refresher applies the floor)
    pub fn revoked_sync_interval(&self) -> Duration {
        Duration::from_secs(self.revoked_sync_seconds)
    }

    /// The signing secret, if one is configured and non-blank
    pub fn secret(&self) -> Option<&SecretString> {
        self.jwt_secret
            .as_ref()
            .filter(|s| !s.expose_secret().trim().is_empty())
    }

    /// Validate authentication configuration
    ///
    /// Requiring auth without a secret is an error rather than a silent
    /// reject-everything mode.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.require_auth && self.secret().is_none() {
            return Err(ValidationError::MissingRequired("WS_JWT_SECRET"));
        }

        let url = self.auth_service_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ValidationError::InvalidAuthServiceUrl);
        }

        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            require_auth: false,
            jwt_secret: None,
            auth_service_url: default_auth_service_url(),
            revoked_sync_seconds: default_revoked_sync_seconds(),
        }
    }
}

fn default_auth_service_url() -> String {
    "http://auth-service:8001".to_string()
}

fn default_revoked_sync_seconds() -> u64 {
    30
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSeconds {
    Number(i64),
    Text(String),
}

fn lenient_seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match RawSeconds::deserialize(deserializer)? {
        RawSeconds::Number(n) => Some(n),
        RawSeconds::Text(text) => text.trim().parse::<i64>().ok(),
    };

    Ok(match parsed {
        Some(n) => n.max(0) as u64,
        None => {
            tracing::warn!(
                default = default_revoked_sync_seconds(),
                "REVOKED_SYNC_SECONDS is not a whole number of seconds, using default"
            );
            default_revoked_sync_seconds()
        }
    })
}
