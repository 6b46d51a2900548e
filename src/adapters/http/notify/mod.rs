//! External event injection over HTTP.

mod dto;
mod handlers;
mod routes;

pub use dto::{NotifyOverrides, NotifyResponse};
pub use handlers::{method_not_allowed, notify, target_room, NotifyParams};
pub use routes::notify_routes;
