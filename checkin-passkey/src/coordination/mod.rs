mod errors;
mod passkey;

pub use errors::CoordinationError;
pub use passkey::{
    get_passkey_status, handle_finish_authentication_core, handle_finish_registration_core,
    handle_logout_core, handle_start_authentication_core, handle_start_registration_core,
};
