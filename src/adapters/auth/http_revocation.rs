//! Revocation list fetched from the identity service over HTTP.
//!
//! `GET {base}/auth/revoked` is expected to answer `{"jtis": ["...", ...]}`.
//! Non-string entries in the array are skipped.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::ports::{RevocationError, RevocationSource};

/// Default identity service location.
pub const DEFAULT_AUTH_SERVICE_URL: &str = "http://auth-service:8001";

const REVOKED_PATH: &str = "/auth/revoked";

/// Bounds each fetch so a hung authority cannot stall the refresher.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the identity service's revocation endpoint.
#[derive(Debug, Clone)]
pub struct HttpRevocationSource {
    client: reqwest::Client,
    url: String,
}

impl HttpRevocationSource {
    /// Create a source for the given base URL (trailing slashes are ignored).
    pub fn new(base_url: &str) -> Result<Self, RevocationError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| RevocationError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            url: revoked_url(base_url),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn revoked_url(base_url: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let base = if base.is_empty() { DEFAULT_AUTH_SERVICE_URL } else { base };
    format!("{}{}", base, REVOKED_PATH)
}

/// Extract the `jtis` string entries from a revocation response body.
pub(crate) fn parse_revoked(body: &Value) -> Result<Vec<String>, RevocationError> {
    let entries = body
        .get("jtis")
        .and_then(Value::as_array)
        .ok_or_else(|| RevocationError::Malformed("missing jtis array".to_string()))?;

    Ok(entries
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect())
}

#[async_trait]
impl RevocationSource for HttpRevocationSource {
    async fn fetch_revoked(&self) -> Result<Vec<String>, RevocationError> {
        tracing::trace!("Fetching revocation list from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| RevocationError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(RevocationError::BadStatus(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RevocationError::Malformed(e.to_string()))?;

        parse_revoked(&body)
    }
}
