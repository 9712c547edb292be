use subtle::ConstantTimeEq;

use crate::passkey::{
    ADMIN_BOOTSTRAP_SECRET, AuthenticationOptions, AuthenticatorResponse, CredentialStore,
    RegisterCredential, RegistrationOptions, finish_authentication, finish_registration,
    start_authentication, start_registration,
};
use crate::session::{create_session, revoke_session, validate_session};

use super::errors::CoordinationError;

/// Whether at least one admin passkey is registered. Public information,
/// surfaced so the admin UI can choose between the bootstrap and login flows.
pub async fn get_passkey_status() -> Result<bool, CoordinationError> {
    Ok(CredentialStore::count().await.map_err(CoordinationError::from)? > 0)
}

fn bootstrap_secret_matches(presented: &str) -> bool {
    presented
        .as_bytes()
        .ct_eq(ADMIN_BOOTSTRAP_SECRET.as_bytes())
        .into()
}

/// Gate and start the registration ceremony.
///
/// While no credential exists, only the bootstrap secret opens the door;
/// once one does, only a live admin session may add another passkey and the
/// bootstrap secret stops working. Every other caller gets the same generic
/// rejection.
pub async fn handle_start_registration_core(
    bootstrap_secret: Option<&str>,
    session_token: Option<&str>,
) -> Result<RegistrationOptions, CoordinationError> {
    let has_credentials = CredentialStore::count().await? > 0;

    if has_credentials {
        match session_token {
            Some(token) if validate_session(token).await.is_ok() => {}
            _ => return Err(CoordinationError::Unauthorized.log()),
        }
    } else {
        match bootstrap_secret {
            Some(secret) if bootstrap_secret_matches(secret) => {}
            _ => return Err(CoordinationError::Unauthorized.log()),
        }
    }

    Ok(start_registration().await?)
}

/// Verify an attestation response and persist the credential.
pub async fn handle_finish_registration_core(
    reg_data: RegisterCredential,
) -> Result<String, CoordinationError> {
    let credential_id = finish_registration(&reg_data).await?;
    Ok(credential_id)
}

/// Start the authentication ceremony. This IS the login flow, so no prior
/// authorization applies, but with nothing to authenticate against the call
/// is answered not-found.
pub async fn handle_start_authentication_core()
-> Result<AuthenticationOptions, CoordinationError> {
    if CredentialStore::count().await? == 0 {
        return Err(CoordinationError::ResourceNotFound {
            resource_type: "passkey".to_string(),
            resource_id: "admin".to_string(),
        }
        .log());
    }

    Ok(start_authentication().await?)
}

/// Verify an assertion and mint a session token for the admin.
pub async fn handle_finish_authentication_core(
    auth_response: AuthenticatorResponse,
) -> Result<String, CoordinationError> {
    let credential_id = finish_authentication(&auth_response).await?;

    let token = create_session().await?;

    tracing::info!("Issued admin session for credential {}", credential_id);

    Ok(token)
}

/// Revoke the presented session. Idempotent.
pub async fn handle_logout_core(session_token: &str) -> Result<(), CoordinationError> {
    revoke_session(session_token).await?;
    Ok(())
}
