//! Axum integration for the checkin-passkey authentication core: routers and
//! handlers for the admin passkey ceremonies, plus the auth-gate middleware
//! every other admin endpoint mounts.

mod config;
mod error;
mod middleware;
mod passkey;
mod router;
mod session;

pub use config::ADMIN_ROUTE_PREFIX;
pub use middleware::require_admin_session;
pub use router::admin_passkey_router;

// Re-export the initialization function from the core crate
pub use checkin_passkey::init;
