use chrono::{Duration, Utc};

use crate::passkey::config::PASSKEY_CHALLENGE_TIMEOUT;
use crate::passkey::errors::PasskeyError;
use crate::passkey::types::{ChallengePurpose, StoredChallenge};
use crate::storage::{CACHE_STORE, CacheData};
use crate::utils::{base64url_decode, gen_random_string};

const CHALLENGE_PREFIX: &str = "admin_challenge";

/// Issues a fresh single-use challenge for the given ceremony.
///
/// The value is 32 random bytes, base64url-encoded, and doubles as the cache
/// key so that consumption can look it up by the value a client presents.
pub(crate) async fn issue_challenge(purpose: ChallengePurpose) -> Result<String, PasskeyError> {
    let challenge = gen_random_string(32)?;
    let stored = StoredChallenge {
        purpose,
        expires_at: Utc::now() + Duration::seconds(*PASSKEY_CHALLENGE_TIMEOUT as i64),
    };

    CACHE_STORE
        .lock()
        .await
        .put_with_ttl(
            CHALLENGE_PREFIX,
            &challenge,
            stored.into(),
            *PASSKEY_CHALLENGE_TIMEOUT as usize,
        )
        .await?;

    tracing::debug!("Issued {} challenge", purpose);

    Ok(challenge)
}

/// Consumes a challenge presented back by a client.
///
/// Whatever entry the lookup hits is removed before anything else is checked,
/// so a value can be presented at most once; a purpose mismatch or an
/// expired entry still burns it. Succeeds only when the entry existed, was
/// issued for `expected` and has not expired.
pub(crate) async fn consume_challenge(
    value: &str,
    expected: ChallengePurpose,
) -> Result<(), PasskeyError> {
    let data = take_challenge_entry(value).await?;

    let Some(data) = data else {
        tracing::debug!("Challenge not found in store");
        return Err(PasskeyError::Challenge(
            "Invalid or expired challenge".to_string(),
        ));
    };

    let stored: StoredChallenge = data.try_into()?;

    if stored.purpose != expected {
        tracing::warn!(
            "Challenge purpose mismatch: stored {}, expected {}",
            stored.purpose,
            expected
        );
        return Err(PasskeyError::Challenge(
            "Invalid or expired challenge".to_string(),
        ));
    }

    if stored.expires_at < Utc::now() {
        tracing::warn!("Challenge expired at {}", stored.expires_at);
        return Err(PasskeyError::Challenge(
            "Invalid or expired challenge".to_string(),
        ));
    }

    Ok(())
}

/// Atomically removes and returns the entry for the presented value.
///
/// Some client stacks hand the challenge back base64url-encoded a second
/// time. When the direct lookup misses, the value is decoded once and the
/// lookup retried with the decoded text. Both paths go through `take`, so the
/// matched entry is consumed either way.
async fn take_challenge_entry(value: &str) -> Result<Option<CacheData>, PasskeyError> {
    let mut store = CACHE_STORE.lock().await;

    if let Some(data) = store.take(CHALLENGE_PREFIX, value).await? {
        return Ok(Some(data));
    }

    let Some(decoded) = base64url_decode(value)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
    else {
        return Ok(None);
    };

    if decoded == value {
        return Ok(None);
    }

    tracing::debug!("Retrying challenge lookup with base64url-decoded value");
    Ok(store.take(CHALLENGE_PREFIX, &decoded).await?)
}
