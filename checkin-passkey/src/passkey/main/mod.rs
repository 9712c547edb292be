mod attestation;
mod auth;
mod challenge;
mod register;
mod types;

pub use types::{
    AuthenticationOptions, AuthenticatorResponse, CredentialDescriptor,
    PublicKeyCredentialUserEntity, RegisterCredential, RegistrationOptions,
};

pub(crate) use auth::{finish_authentication, start_authentication};
pub(crate) use register::{finish_registration, start_registration};
