use axum::middleware::from_fn;
use axum::routing::{Router, get, post};

use crate::middleware::require_admin_session;
use crate::passkey::{
    auth_options, auth_verify, logout, passkey_status, register_options, register_verify,
    session_probe,
};

/// Router for the admin passkey surface. Mount under [`crate::ADMIN_ROUTE_PREFIX`].
///
/// Authorization for /passkeys/register/options is decided inside the
/// handler (bootstrap secret vs session), so only /logout and /session sit
/// behind the auth-gate middleware here; other admin routes should apply
/// [`require_admin_session`] themselves.
pub fn admin_passkey_router() -> Router {
    Router::new()
        .route("/passkeys/status", get(passkey_status))
        .route("/passkeys/register/options", post(register_options))
        .route("/passkeys/register/verify", post(register_verify))
        .route("/passkeys/auth/options", post(auth_options))
        .route("/passkeys/auth/verify", post(auth_verify))
        .route(
            "/logout",
            post(logout).route_layer(from_fn(require_admin_session)),
        )
        .route(
            "/session",
            get(session_probe).route_layer(from_fn(require_admin_session)),
        )
}
