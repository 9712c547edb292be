mod config;
mod errors;
mod main;
mod storage;
mod types;

pub use errors::PasskeyError;

pub use main::{
    AuthenticationOptions, AuthenticatorResponse, CredentialDescriptor,
    PublicKeyCredentialUserEntity, RegisterCredential, RegistrationOptions,
};

pub use types::StoredCredential;

pub(crate) use config::ADMIN_BOOTSTRAP_SECRET;
pub(crate) use main::{
    finish_authentication, finish_registration, start_authentication, start_registration,
};
pub(crate) use storage::CredentialStore;

pub(crate) async fn init() -> Result<(), PasskeyError> {
    // Validate required environment variables early
    let _ = *config::PASSKEY_RP_ID;
    let _ = *config::ADMIN_BOOTSTRAP_SECRET;

    crate::storage::init()
        .await
        .map_err(|e| PasskeyError::Storage(e.to_string()))?;

    CredentialStore::init().await?;

    Ok(())
}
