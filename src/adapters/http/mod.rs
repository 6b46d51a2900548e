//! HTTP adapters - health, stats, notify and the top-level router.

pub mod error;
pub mod health;
pub mod middleware;
pub mod notify;
pub mod router;

pub use error::ErrorResponse;
pub use health::{HealthResponse, StatsResponse};
pub use notify::{notify_routes, NotifyOverrides, NotifyResponse};
pub use router::{build_router, AppState};
