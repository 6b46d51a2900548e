//! Authentication adapters.
//!
//! Implementations of the `TokenValidator` and `RevocationSource` ports,
//! plus the shared revocation snapshot:
//!
//! - `jwt` - HMAC JWT validation with revocation check
//! - `revocation` - Revocation cache and its periodic refresher
//! - `http_revocation` - Fetches the revocation list from the identity service
//! - `gate` - Open/required admission policy used by the upgrade handler
//! - `mock` - Test implementations that don't require external services

mod gate;
mod http_revocation;
mod jwt;
mod mock;
mod revocation;

pub use gate::AuthGate;
pub use http_revocation::{HttpRevocationSource, DEFAULT_AUTH_SERVICE_URL};
pub use jwt::HmacTokenValidator;
pub use mock::{MockTokenValidator, StaticRevocationSource};
pub use revocation::{
    sync_interval, RevocationCache, RevocationSync, DEFAULT_SYNC_INTERVAL, MIN_SYNC_INTERVAL,
};
