//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),

    #[error("Dispatch queue capacity must be between 1 and 65536")]
    InvalidQueueCapacity,

    #[error("Write timeout must be between 1 and 60 seconds")]
    InvalidTimeout,

    #[error("Auth service URL must start with http:// or https://")]
    InvalidAuthServiceUrl,
}
