use chrono::{Duration, Utc};

use super::config::ADMIN_SESSION_TTL;
use super::errors::SessionError;
use super::types::StoredSession;
use crate::storage::CACHE_STORE;
use crate::utils::gen_random_string;

const SESSION_PREFIX: &str = "admin_session";

/// Mints a fresh bearer token for an authenticated admin.
pub(crate) async fn create_session() -> Result<String, SessionError> {
    let token = gen_random_string(32)?;
    let stored = StoredSession {
        expires_at: Utc::now() + Duration::seconds(*ADMIN_SESSION_TTL as i64),
    };

    CACHE_STORE
        .lock()
        .await
        .put_with_ttl(
            SESSION_PREFIX,
            &token,
            stored.into(),
            *ADMIN_SESSION_TTL as usize,
        )
        .await
        .map_err(|e| SessionError::Storage(e.to_string()))?;

    tracing::debug!("Minted admin session");

    Ok(token)
}

/// Checks that a bearer token names a live session.
///
/// Unknown and expired tokens fail identically; an expired entry is removed
/// when seen. Validation has no side effects on a live token (no sliding
/// expiry).
pub async fn validate_session(token: &str) -> Result<(), SessionError> {
    let mut store = CACHE_STORE.lock().await;

    let Some(data) = store
        .get(SESSION_PREFIX, token)
        .await
        .map_err(|e| SessionError::Storage(e.to_string()))?
    else {
        return Err(SessionError::SessionError);
    };

    let stored: StoredSession = data.try_into()?;

    if stored.expires_at < Utc::now() {
        store
            .remove(SESSION_PREFIX, token)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        return Err(SessionError::SessionError);
    }

    Ok(())
}

/// Removes a session. Revoking an unknown token is a no-op.
pub(crate) async fn revoke_session(token: &str) -> Result<(), SessionError> {
    CACHE_STORE
        .lock()
        .await
        .remove(SESSION_PREFIX, token)
        .await
        .map_err(|e| SessionError::Storage(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CacheData;
    use crate::test_utils::init_test_environment;
    use serial_test::serial;

    async fn store_session(token: &str, ttl_secs: i64) {
        let stored = StoredSession {
            expires_at: Utc::now() + Duration::seconds(ttl_secs),
        };
        CACHE_STORE
            .lock()
            .await
            .put_with_ttl(SESSION_PREFIX, token, stored.into(), 86400)
            .await
            .expect("Failed to store session");
    }

    #[tokio::test]
    #[serial]
    async fn test_created_session_validates() {
        init_test_environment().await;

        let token = create_session().await.unwrap();
        // 32 bytes -> 43 base64url characters without padding
        assert_eq!(token.len(), 43);

        assert!(validate_session(&token).await.is_ok());

        // Validation does not consume the session
        assert!(validate_session(&token).await.is_ok());
    }

    #[tokio::test]
    #[serial]
    async fn test_unknown_token_fails_opaquely() {
        init_test_environment().await;

        let result = validate_session("never-minted").await;
        assert!(matches!(result, Err(SessionError::SessionError)));
    }

    #[tokio::test]
    #[serial]
    async fn test_revoked_session_fails_validation() {
        init_test_environment().await;

        let token = create_session().await.unwrap();
        revoke_session(&token).await.unwrap();

        let result = validate_session(&token).await;
        assert!(matches!(result, Err(SessionError::SessionError)));
    }

    #[tokio::test]
    #[serial]
    async fn test_revoke_unknown_token_is_noop() {
        init_test_environment().await;

        assert!(revoke_session("never-minted").await.is_ok());
    }

    #[tokio::test]
    #[serial]
    async fn test_expired_session_fails_and_is_removed() {
        init_test_environment().await;

        store_session("stale_token", -10).await;

        let result = validate_session("stale_token").await;
        assert!(matches!(result, Err(SessionError::SessionError)));

        // The expired entry was removed on first sight
        let leftover = CACHE_STORE
            .lock()
            .await
            .get(SESSION_PREFIX, "stale_token")
            .await
            .unwrap();
        assert!(leftover.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_expired_and_unknown_fail_identically() {
        init_test_environment().await;

        store_session("expired_probe", -10).await;

        let expired = validate_session("expired_probe").await.unwrap_err();
        let unknown = validate_session("unknown_probe").await.unwrap_err();

        assert_eq!(expired.to_string(), unknown.to_string());
    }

    #[tokio::test]
    #[serial]
    async fn test_sessions_do_not_collide_with_challenges() {
        init_test_environment().await;

        // A session token is useless as a challenge and vice versa
        let token = create_session().await.unwrap();
        let as_challenge = CACHE_STORE
            .lock()
            .await
            .get("admin_challenge", &token)
            .await
            .unwrap();
        assert!(as_challenge.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_garbage_cache_entry_surfaces_storage_error() {
        init_test_environment().await;

        CACHE_STORE
            .lock()
            .await
            .put_with_ttl(
                SESSION_PREFIX,
                "corrupted",
                CacheData {
                    value: "not json".to_string(),
                },
                60,
            )
            .await
            .unwrap();

        let result = validate_session("corrupted").await;
        assert!(matches!(result, Err(SessionError::Storage(_))));
    }
}
