use std::{env, sync::LazyLock};

pub(super) static ORIGIN: LazyLock<String> =
    LazyLock::new(|| std::env::var("ORIGIN").expect("ORIGIN must be set"));

/// Relying-party ID: the registrable host of ORIGIN.
pub(super) static PASSKEY_RP_ID: LazyLock<String> = LazyLock::new(|| {
    url::Url::parse(&ORIGIN)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .expect("Could not extract RP ID from ORIGIN")
});

pub(super) static PASSKEY_RP_NAME: LazyLock<String> =
    LazyLock::new(|| env::var("PASSKEY_RP_NAME").ok().unwrap_or(ORIGIN.clone()));

/// Client-side ceremony timeout in seconds (sent to the browser in milliseconds).
pub(super) static PASSKEY_TIMEOUT: LazyLock<u32> = LazyLock::new(|| {
    env::var("PASSKEY_TIMEOUT")
        .map(|v| v.parse::<u32>().unwrap_or(60))
        .unwrap_or(60)
});

/// Server-side challenge lifetime in seconds.
pub(super) static PASSKEY_CHALLENGE_TIMEOUT: LazyLock<u32> = LazyLock::new(|| {
    env::var("PASSKEY_CHALLENGE_TIMEOUT")
        .map(|v| v.parse::<u32>().unwrap_or(300))
        .unwrap_or(300)
});

pub(super) static PASSKEY_ATTESTATION: LazyLock<String> =
    LazyLock::new(|| match env::var("PASSKEY_ATTESTATION").ok() {
        None => "none".to_string(),
        Some(v) => match v.to_lowercase().as_str() {
            "none" => "none".to_string(),
            "direct" => "direct".to_string(),
            "indirect" => "indirect".to_string(),
            invalid => {
                tracing::warn!("Invalid attestation: {}. Using default 'none'", invalid);
                "none".to_string()
            }
        },
    });

pub(super) static PASSKEY_AUTHENTICATOR_ATTACHMENT: LazyLock<String> = LazyLock::new(|| {
    match env::var("PASSKEY_AUTHENTICATOR_ATTACHMENT").ok() {
        None => "platform".to_string(),
        Some(v) => match v.to_lowercase().as_str() {
            "platform" => "platform".to_string(),
            "cross-platform" => "cross-platform".to_string(),
            invalid => {
                tracing::warn!(
                    "Invalid authenticator attachment: {}. Using default 'platform'",
                    invalid
                );
                "platform".to_string()
            }
        },
    }
});

pub(super) static PASSKEY_RESIDENT_KEY: LazyLock<String> = LazyLock::new(|| {
    env::var("PASSKEY_RESIDENT_KEY").map_or("required".to_string(), |v| {
        match v.to_lowercase().as_str() {
            "required" => "required".to_string(),
            "preferred" => "preferred".to_string(),
            "discouraged" => "discouraged".to_string(),
            _ => {
                tracing::warn!("Invalid resident key: {}. Using default 'required'", v);
                "required".to_string()
            }
        }
    })
});

pub(super) static PASSKEY_USER_VERIFICATION: LazyLock<String> = LazyLock::new(|| {
    env::var("PASSKEY_USER_VERIFICATION").map_or("preferred".to_string(), |v| {
        match v.to_lowercase().as_str() {
            "required" => "required".to_string(),
            "preferred" => "preferred".to_string(),
            "discouraged" => "discouraged".to_string(),
            _ => {
                tracing::warn!("Invalid user verification: {}. Using default 'preferred'", v);
                "preferred".to_string()
            }
        }
    })
});

/// Counter policy: when true, an assertion whose counter equals the stored
/// value is rejected. A strictly lower counter is always rejected, and a
/// counter of zero is taken to mean the authenticator has no counter at all.
pub(super) static PASSKEY_COUNTER_REQUIRE_INCREASE: LazyLock<bool> = LazyLock::new(|| {
    env::var("PASSKEY_COUNTER_REQUIRE_INCREASE")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false)
});

/// Shared secret that gates the very first registration, before any
/// credential exists.
pub(crate) static ADMIN_BOOTSTRAP_SECRET: LazyLock<String> = LazyLock::new(|| {
    std::env::var("ADMIN_BOOTSTRAP_SECRET").expect("ADMIN_BOOTSTRAP_SECRET must be set")
});
