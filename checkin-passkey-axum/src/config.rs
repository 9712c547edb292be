//! Central configuration for the checkin-passkey-axum crate

use std::sync::LazyLock;

/// Prefix under which the admin passkey routes are mounted.
/// Default: "/api/admin"
pub static ADMIN_ROUTE_PREFIX: LazyLock<String> = LazyLock::new(|| {
    let prefix = std::env::var("ADMIN_ROUTE_PREFIX").unwrap_or_else(|_| "/api/admin".to_string());
    if !prefix.starts_with('/') {
        tracing::warn!(
            "ADMIN_ROUTE_PREFIX '{}' does not start with '/', prepending one",
            prefix
        );
        format!("/{prefix}")
    } else {
        prefix
    }
});
