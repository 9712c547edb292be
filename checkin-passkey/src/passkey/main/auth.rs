use ring::{digest, signature::UnparsedPublicKey};

use super::challenge::{consume_challenge, issue_challenge};
use super::register::credential_descriptors;
use super::types::{
    AuthenticationOptions, AuthenticatorData, AuthenticatorResponse, ParsedClientData,
};

use crate::passkey::config::{
    PASSKEY_COUNTER_REQUIRE_INCREASE, PASSKEY_RP_ID, PASSKEY_TIMEOUT, PASSKEY_USER_VERIFICATION,
};
use crate::passkey::errors::PasskeyError;
use crate::passkey::storage::CredentialStore;
use crate::passkey::types::{ChallengePurpose, StoredCredential};

use crate::utils::base64url_decode;

/// Builds assertion options for an admin login attempt.
///
/// This is the login flow, so no prior authorization is required; the
/// coordination layer has already rejected the call if no credential exists.
pub(crate) async fn start_authentication() -> Result<AuthenticationOptions, PasskeyError> {
    let challenge = issue_challenge(ChallengePurpose::Authenticate).await?;

    let allow_credentials = credential_descriptors().await?;

    let options = AuthenticationOptions {
        challenge,
        timeout: (*PASSKEY_TIMEOUT) * 1000, // Convert seconds to milliseconds
        rp_id: PASSKEY_RP_ID.to_string(),
        allow_credentials,
        user_verification: PASSKEY_USER_VERIFICATION.to_string(),
    };

    tracing::debug!("Authentication options: {:?}", options);

    Ok(options)
}

/// Verifies an assertion against the stored credential.
///
/// Returns the credential ID on success; the coordination layer mints the
/// session. The counter is persisted only after the signature checks out.
pub(crate) async fn finish_authentication(
    auth_response: &AuthenticatorResponse,
) -> Result<String, PasskeyError> {
    let client_data = ParsedClientData::from_base64(&auth_response.response.client_data_json)?;
    client_data.verify("webauthn.get")?;

    consume_challenge(&client_data.challenge, ChallengePurpose::Authenticate).await?;

    let stored_credential = CredentialStore::get_credential(&auth_response.id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Assertion for credential not on file");
            PasskeyError::NotFound("Unknown passkey".to_string())
        })?;

    let auth_data = AuthenticatorData::from_base64(&auth_response.response.authenticator_data)?;
    auth_data.verify()?;

    tracing::debug!(
        "User present: {}, user verified: {}, attested credential data: {}",
        auth_data.is_user_present(),
        auth_data.is_user_verified(),
        auth_data.has_attested_credential_data()
    );

    let new_counter = check_counter(&stored_credential, auth_data.counter)?;

    verify_signature(auth_response, &client_data, &auth_data, &stored_credential)?;

    if let Some(counter) = new_counter {
        CredentialStore::update_credential_counter(&stored_credential.credential_id, counter)
            .await?;
    }

    tracing::info!(
        "Admin authenticated with passkey {}",
        stored_credential.credential_id
    );

    Ok(stored_credential.credential_id)
}

/// Applies the signature-counter contract.
///
/// A reported counter of zero means the authenticator does not implement
/// counters and is tolerated as long as the stored value is also zero. A
/// strictly lower counter is always a clone signal. Equality is rejected only
/// under the strict policy; otherwise it is tolerated without persisting.
/// Returns the counter to persist, if any.
fn check_counter(
    stored_credential: &StoredCredential,
    reported: u32,
) -> Result<Option<u32>, PasskeyError> {
    let stored = stored_credential.counter;

    if reported == 0 && stored == 0 {
        tracing::debug!("Authenticator does not implement a signature counter");
        return Ok(None);
    }

    if reported < stored {
        tracing::warn!(
            "Counter regression for {}: stored {}, reported {}",
            stored_credential.credential_id,
            stored,
            reported
        );
        return Err(PasskeyError::Authentication(
            "Counter regression detected - possible cloned authenticator".to_string(),
        ));
    }

    if reported == stored {
        if *PASSKEY_COUNTER_REQUIRE_INCREASE {
            return Err(PasskeyError::Authentication(
                "Counter did not increase - possible cloned authenticator".to_string(),
            ));
        }
        tracing::warn!(
            "Counter did not increase for {} (stored {})",
            stored_credential.credential_id,
            stored
        );
        return Ok(None);
    }

    Ok(Some(reported))
}

/// Verifies the assertion signature over authenticatorData || SHA256(clientDataJSON)
/// against the stored P-256 public key.
fn verify_signature(
    auth_response: &AuthenticatorResponse,
    client_data: &ParsedClientData,
    auth_data: &AuthenticatorData,
    stored_credential: &StoredCredential,
) -> Result<(), PasskeyError> {
    let public_key = base64url_decode(&stored_credential.public_key)
        .map_err(|e| PasskeyError::Format(format!("Invalid public key: {e}")))?;

    let signature = base64url_decode(&auth_response.response.signature)
        .map_err(|e| PasskeyError::Format(format!("Invalid signature: {e}")))?;

    let client_data_hash = digest::digest(&digest::SHA256, &client_data.raw_data);
    let mut signed_data = Vec::new();
    signed_data.extend_from_slice(&auth_data.raw_data);
    signed_data.extend_from_slice(client_data_hash.as_ref());

    UnparsedPublicKey::new(&ring::signature::ECDSA_P256_SHA256_ASN1, &public_key)
        .verify(&signed_data, &signature)
        .map_err(|_| {
            tracing::error!(
                "Signature verification failed for {}",
                stored_credential.credential_id
            );
            PasskeyError::Verification("Signature verification failed".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_environment;
    use chrono::Utc;
    use serial_test::serial;

    fn credential_with_counter(counter: u32) -> StoredCredential {
        StoredCredential {
            credential_id: "cred_auth".to_string(),
            public_key: "KEY".to_string(),
            counter,
            transports: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_check_counter_zero_on_both_sides_is_tolerated() {
        let credential = credential_with_counter(0);
        assert_eq!(check_counter(&credential, 0).unwrap(), None);
    }

    #[test]
    fn test_check_counter_increase_is_persisted() {
        let credential = credential_with_counter(5);
        assert_eq!(check_counter(&credential, 6).unwrap(), Some(6));
    }

    #[test]
    fn test_check_counter_regression_is_rejected() {
        let credential = credential_with_counter(10);
        assert!(matches!(
            check_counter(&credential, 4),
            Err(PasskeyError::Authentication(_))
        ));

        // A zero report against a non-zero stored value is also a regression
        assert!(matches!(
            check_counter(&credential, 0),
            Err(PasskeyError::Authentication(_))
        ));
    }

    #[test]
    fn test_check_counter_equality_tolerated_under_default_policy() {
        // PASSKEY_COUNTER_REQUIRE_INCREASE defaults to false
        let credential = credential_with_counter(7);
        assert_eq!(check_counter(&credential, 7).unwrap(), None);
    }

    #[tokio::test]
    #[serial]
    async fn test_start_authentication_lists_stored_credentials() {
        init_test_environment().await;
        CredentialStore::delete_all_credentials().await.unwrap();

        CredentialStore::store_credential(StoredCredential {
            credential_id: "the_only_passkey".to_string(),
            public_key: "KEY".to_string(),
            counter: 0,
            transports: Some(vec!["internal".to_string()]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .await
        .unwrap();

        let options = start_authentication().await.unwrap();

        assert_eq!(options.allow_credentials().len(), 1);
        assert_eq!(options.allow_credentials()[0].id, "the_only_passkey");
        assert_eq!(options.rp_id, "localhost");
    }

    #[tokio::test]
    #[serial]
    async fn test_finish_authentication_rejects_unknown_credential() {
        init_test_environment().await;
        CredentialStore::delete_all_credentials().await.unwrap();

        let challenge = issue_challenge(ChallengePurpose::Authenticate).await.unwrap();

        let client_data = serde_json::json!({
            "type": "webauthn.get",
            "challenge": challenge,
            "origin": "http://localhost:3001",
        });
        let auth_response: AuthenticatorResponse = serde_json::from_value(serde_json::json!({
            "id": "nobody_registered_this",
            "rawId": "nobody_registered_this",
            "type": "public-key",
            "response": {
                "clientDataJSON": crate::utils::base64url_encode(
                    client_data.to_string().into_bytes()
                ).unwrap(),
                "authenticatorData": "AAAA",
                "signature": "sig",
                "userHandle": null,
            }
        }))
        .unwrap();

        let result = finish_authentication(&auth_response).await;
        assert!(matches!(result, Err(PasskeyError::NotFound(_))));
    }

    #[tokio::test]
    #[serial]
    async fn test_finish_authentication_rejects_replayed_challenge() {
        init_test_environment().await;
        CredentialStore::delete_all_credentials().await.unwrap();

        let challenge = issue_challenge(ChallengePurpose::Authenticate).await.unwrap();
        consume_challenge(&challenge, ChallengePurpose::Authenticate)
            .await
            .unwrap();

        let client_data = serde_json::json!({
            "type": "webauthn.get",
            "challenge": challenge,
            "origin": "http://localhost:3001",
        });
        let auth_response: AuthenticatorResponse = serde_json::from_value(serde_json::json!({
            "id": "cred",
            "rawId": "cred",
            "type": "public-key",
            "response": {
                "clientDataJSON": crate::utils::base64url_encode(
                    client_data.to_string().into_bytes()
                ).unwrap(),
                "authenticatorData": "AAAA",
                "signature": "sig",
                "userHandle": null,
            }
        }))
        .unwrap();

        let result = finish_authentication(&auth_response).await;
        assert!(matches!(result, Err(PasskeyError::Challenge(_))));
    }
}
