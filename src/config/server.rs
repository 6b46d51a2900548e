//! Server configuration

use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use super::error::ValidationError;

/// Largest dispatch queue accepted.
const MAX_QUEUE_CAPACITY: usize = 65_536;

/// Longest per-write deadline accepted, in seconds.
const MAX_WRITE_TIMEOUT_SECS: u64 = 60;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(rename = "ws_host", default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(rename = "ws_port", default = "default_port")]
    pub port: u16,

    /// Allowed WebSocket origins (comma-separated, empty allows any)
    #[serde(default)]
    pub allowed_origins: Option<String>,

    /// Rust log filter directive
    #[serde(rename = "ws_log_level", default = "default_log_level")]
    pub log_level: String,

    /// Broadcast queue capacity
    #[serde(rename = "ws_dispatch_queue_capacity", default = "default_queue_capacity")]
    pub dispatch_queue_capacity: usize,

    /// Per-connection write deadline in seconds
    #[serde(rename = "ws_write_timeout_secs", default = "default_write_timeout")]
    pub write_timeout_secs: u64,
}

impl ServerConfig {
    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|_| ValidationError::InvalidAddress(addr))
    }

    /// Get allowed origins as a vector (blank entries dropped)
    pub fn allowed_origins_list(&self) -> Vec<String> {
        self.allowed_origins
            .as_ref()
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    /// Validate server configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        self.socket_addr()?;
        if self.dispatch_queue_capacity == 0 || self.dispatch_queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(ValidationError::InvalidQueueCapacity);
        }
        if self.write_timeout_secs == 0 || self.write_timeout_secs > MAX_WRITE_TIMEOUT_SECS {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: None,
            log_level: default_log_level(),
            dispatch_queue_capacity: default_queue_capacity(),
            write_timeout_secs: default_write_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info,ws_notifier=debug".to_string()
}

fn default_queue_capacity() -> usize {
    256
}

fn default_write_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.dispatch_queue_capacity, 256);
        assert_eq!(config.write_timeout(), Duration::from_secs(10));
        assert!(config.allowed_origins_list().is_empty());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            ..Default::default()
        };
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_socket_addr_rejects_hostname_garbage() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_allowed_origins_list() {
        let config = ServerConfig {
            allowed_origins: Some("https://a.example, ,https://b.example".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.allowed_origins_list(),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn test_validation_invalid_port() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPort));
    }

    #[test]
    fn test_validation_queue_capacity_bounds() {
        for capacity in [0, 65_537] {
            let config = ServerConfig {
                dispatch_queue_capacity: capacity,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidQueueCapacity));
        }
    }

    #[test]
    fn test_validation_write_timeout_bounds() {
        for secs in [0, 61] {
            let config = ServerConfig {
                write_timeout_secs: secs,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
        }
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(ServerConfig::default().validate().is_ok());
    }
}
