//! Shared test initialization.
//!
//! Tests across the crate share the process-wide cache and data stores, so
//! they all go through the same setup: environment defaults first (loaded
//! once), then store initialization. Tests that depend on credential counts
//! additionally run under `#[serial]` and reset the credentials table.

use std::env;
use std::sync::Once;

/// Ensures the environment is configured and the global stores are
/// initialized. Safe to call from every test.
pub(crate) async fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        // A developer-provided .env_test wins; anything it leaves unset gets
        // an in-process default.
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }

        set_default_env("ORIGIN", "http://localhost:3001");
        set_default_env("ADMIN_BOOTSTRAP_SECRET", "test-bootstrap-secret");
        set_default_env("CACHE_STORE_TYPE", "memory");
        set_default_env("CACHE_STORE_URL", "memory");
        set_default_env("DATA_STORE_TYPE", "sqlite");
        set_default_env(
            "DATA_STORE_URL",
            "sqlite:file:checkin_passkey_test?mode=memory&cache=shared",
        );
    });

    if let Err(e) = crate::storage::init().await {
        eprintln!("Warning: Failed to initialize stores: {e}");
    }
    if let Err(e) = crate::passkey::CredentialStore::init().await {
        eprintln!("Warning: Failed to initialize CredentialStore: {e}");
    }
}

fn set_default_env(key: &str, value: &str) {
    if env::var(key).is_err() {
        unsafe { env::set_var(key, value) };
    }
}
