//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Variable names are flat and unprefixed
//! (`WS_PORT`, `WS_JWT_SECRET`, `AUTH_SERVICE_URL`, ...) so the relay shares
//! a deployment environment with the other services. Empty values count as
//! unset.
//!
//! # Example
//!
//! ```no_run
//! use ws_notifier::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod auth;
mod error;
mod server;

pub use auth::AuthConfig;
pub use error::{ConfigError, ValidationError};
pub use server::ServerConfig;

/// Root application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Listener, origins, logging and dispatcher settings
    pub server: ServerConfig,

    /// Authentication and revocation sync
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads the process environment, ignoring empty values
    /// 3. Deserializes each section from the same flat key space
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load from the process environment only, without reading `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let source = config::Config::builder()
            .add_source(config::Environment::default().ignore_empty(true))
            .build()?;

        Ok(Self {
            server: source.clone().try_deserialize()?,
            auth: source.try_deserialize()?,
        })
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.auth.validate()?;
        Ok(())
    }

    /// True when connections are admitted without credentials
    pub fn is_open_mode(&self) -> bool {
        !self.auth.require_auth
    }
}
