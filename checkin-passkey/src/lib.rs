//! checkin-passkey - Admin passkey authentication core for the hotel
//! self-check-in service.
//!
//! Guests never touch this crate. It exists so that the administrator can
//! register WebAuthn passkeys and obtain bearer session tokens that gate
//! every admin endpoint. The very first registration is gated by a bootstrap
//! secret; every later one requires a live session.
//!
//! The crate is framework-agnostic: no HTTP types appear in its API. The
//! `checkin-passkey-axum` crate maps these functions onto routes.

mod coordination;
mod passkey;
mod session;
mod storage;
#[cfg(test)]
mod test_utils;
mod utils;

// Re-export the coordination entry points that HTTP integrations call
pub use coordination::{
    CoordinationError, get_passkey_status, handle_finish_authentication_core,
    handle_finish_registration_core, handle_logout_core, handle_start_authentication_core,
    handle_start_registration_core,
};

pub use passkey::{
    AuthenticationOptions, AuthenticatorResponse, CredentialDescriptor, PasskeyError,
    RegisterCredential, RegistrationOptions, StoredCredential,
};

pub use session::{SessionError, validate_session};

/// Initialize the authentication core: validates required configuration and
/// connects the cache and data stores.
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    passkey::init().await?;
    Ok(())
}
