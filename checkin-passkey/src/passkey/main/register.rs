use chrono::Utc;

use super::attestation::{extract_attested_credential, parse_attestation_object, verify_attestation};
use super::challenge::{consume_challenge, issue_challenge};
use super::types::{
    AuthenticatorSelection, CredentialDescriptor, ParsedClientData, PubKeyCredParam,
    PublicKeyCredentialUserEntity, RegisterCredential, RegistrationOptions, RelyingParty,
};

use crate::passkey::config::{
    PASSKEY_ATTESTATION, PASSKEY_AUTHENTICATOR_ATTACHMENT, PASSKEY_RESIDENT_KEY, PASSKEY_RP_ID,
    PASSKEY_RP_NAME, PASSKEY_TIMEOUT, PASSKEY_USER_VERIFICATION,
};
use crate::passkey::errors::PasskeyError;
use crate::passkey::storage::CredentialStore;
use crate::passkey::types::{ChallengePurpose, StoredCredential};

// The admin console has a single operator identity, so the user entity
// presented to the authenticator is fixed.
const ADMIN_USER_HANDLE: &str = "checkin-admin";
const ADMIN_USER_NAME: &str = "admin";
const ADMIN_DISPLAY_NAME: &str = "Administrator";

/// Builds creation options for a new admin passkey.
///
/// Authorization (bootstrap secret or existing session) is checked by the
/// coordination layer before this runs. Every credential already on file is
/// listed in `excludeCredentials` so an authenticator cannot register twice.
pub(crate) async fn start_registration() -> Result<RegistrationOptions, PasskeyError> {
    let challenge = issue_challenge(ChallengePurpose::Register).await?;

    let exclude_credentials = credential_descriptors().await?;

    let authenticator_selection = AuthenticatorSelection {
        authenticator_attachment: PASSKEY_AUTHENTICATOR_ATTACHMENT.to_string(),
        resident_key: PASSKEY_RESIDENT_KEY.to_string(),
        require_resident_key: *PASSKEY_RESIDENT_KEY == "required",
        user_verification: PASSKEY_USER_VERIFICATION.to_string(),
    };

    let options = RegistrationOptions {
        challenge,
        rp_id: PASSKEY_RP_ID.to_string(),
        rp: RelyingParty {
            name: PASSKEY_RP_NAME.to_string(),
            id: PASSKEY_RP_ID.to_string(),
        },
        user: PublicKeyCredentialUserEntity {
            id: ADMIN_USER_HANDLE.to_string(),
            name: ADMIN_USER_NAME.to_string(),
            display_name: ADMIN_DISPLAY_NAME.to_string(),
        },
        pub_key_cred_params: vec![
            PubKeyCredParam {
                type_: "public-key".to_string(),
                alg: -7,
            },
            PubKeyCredParam {
                type_: "public-key".to_string(),
                alg: -257,
            },
        ],
        exclude_credentials,
        authenticator_selection,
        timeout: (*PASSKEY_TIMEOUT) * 1000, // Convert seconds to milliseconds
        attestation: PASSKEY_ATTESTATION.to_string(),
    };

    tracing::debug!("Registration options: {:?}", options);

    Ok(options)
}

/// Verifies an attestation response and persists the new credential.
///
/// Returns the credential ID on success.
pub(crate) async fn finish_registration(
    reg_data: &RegisterCredential,
) -> Result<String, PasskeyError> {
    let client_data = ParsedClientData::from_base64(&reg_data.response.client_data_json)?;
    client_data.verify("webauthn.create")?;

    consume_challenge(&client_data.challenge, ChallengePurpose::Register).await?;

    let attestation = parse_attestation_object(&reg_data.response.attestation_object)?;
    verify_attestation(&attestation, &client_data.raw_data)?;

    let attested = extract_attested_credential(&attestation.auth_data)?;

    let now = Utc::now();
    let credential = StoredCredential {
        credential_id: attested.credential_id.clone(),
        public_key: attested.public_key,
        counter: attested.counter,
        transports: reg_data.response.transports.clone(),
        created_at: now,
        updated_at: now,
    };

    CredentialStore::store_credential(credential).await?;

    tracing::info!("Registered admin passkey {}", attested.credential_id);

    Ok(attested.credential_id)
}

/// Descriptors for every credential on file, shared by the registration
/// excludeCredentials list and the authentication allowCredentials list.
pub(super) async fn credential_descriptors() -> Result<Vec<CredentialDescriptor>, PasskeyError> {
    let credentials = CredentialStore::get_all_credentials().await?;

    Ok(credentials
        .into_iter()
        .map(|c| CredentialDescriptor {
            type_: "public-key".to_string(),
            id: c.credential_id,
            transports: c.transports,
        })
        .collect())
}
