//! Shared setup for integration tests.
//!
//! Each integration test binary is its own process, so the global cache and
//! data stores start empty here; tests within one binary share them and run
//! as a single scenario.

pub mod fixtures;

use std::env;
use std::sync::Once;

pub const ORIGIN: &str = "http://localhost:3001";
pub const BOOTSTRAP_SECRET: &str = "integration-bootstrap-secret";

/// Configure the environment and initialize the stores. Safe to call more
/// than once.
pub async fn setup() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        set_env("ORIGIN", ORIGIN);
        set_env("ADMIN_BOOTSTRAP_SECRET", BOOTSTRAP_SECRET);
        set_env("CACHE_STORE_TYPE", "memory");
        set_env("CACHE_STORE_URL", "memory");
        set_env("DATA_STORE_TYPE", "sqlite");
        set_env(
            "DATA_STORE_URL",
            "sqlite:file:checkin_integration?mode=memory&cache=shared",
        );
    });

    checkin_passkey::init()
        .await
        .expect("Failed to initialize authentication core");
}

fn set_env(key: &str, value: &str) {
    unsafe { env::set_var(key, value) };
}
