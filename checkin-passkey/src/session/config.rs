use std::{env, sync::LazyLock};

/// Admin session lifetime in seconds.
pub(super) static ADMIN_SESSION_TTL: LazyLock<u64> = LazyLock::new(|| {
    env::var("ADMIN_SESSION_TTL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(86400) // Default to 24 hours if not set or invalid
});
