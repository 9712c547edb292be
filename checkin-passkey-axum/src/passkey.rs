use axum::{
    Json,
    http::{HeaderMap, StatusCode, Uri},
};
use serde::Deserialize;
use serde_json::{Value, json};

use checkin_passkey::{
    AuthenticationOptions, AuthenticatorResponse, RegisterCredential, RegistrationOptions,
    get_passkey_status, handle_finish_authentication_core, handle_finish_registration_core,
    handle_logout_core, handle_start_authentication_core, handle_start_registration_core,
};

use crate::error::IntoResponseError;
use crate::session::session_token_from_parts;

/// GET /passkeys/status: public probe the admin UI uses to decide between
/// the bootstrap and login flows.
pub(crate) async fn passkey_status() -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let has_passkey = get_passkey_status().await.into_response_error()?;
    Ok(Json(json!({ "hasPasskey": has_passkey })))
}

/// Optional body for the register-options request; the bootstrap token may
/// come here instead of the `x-admin-token` header.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterOptionsRequest {
    bootstrap_token: Option<String>,
}

/// POST /passkeys/register/options: gated by the bootstrap secret
/// (`x-admin-token` header or `bootstrapToken` body field) while no
/// credential exists, and by a session token afterwards.
pub(crate) async fn register_options(
    headers: HeaderMap,
    uri: Uri,
    body: Option<Json<RegisterOptionsRequest>>,
) -> Result<Json<RegistrationOptions>, (StatusCode, Json<Value>)> {
    let bootstrap_secret = headers
        .get("x-admin-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| body.and_then(|Json(request)| request.bootstrap_token));

    let session_token = session_token_from_parts(&headers, uri.query());

    let options =
        handle_start_registration_core(bootstrap_secret.as_deref(), session_token.as_deref())
            .await
            .into_response_error()?;

    Ok(Json(options))
}

/// POST /passkeys/register/verify
pub(crate) async fn register_verify(
    Json(reg_data): Json<RegisterCredential>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    handle_finish_registration_core(reg_data)
        .await
        .into_response_error()?;

    Ok(Json(json!({ "success": true })))
}

/// POST /passkeys/auth/options: no auth required; this is the login flow.
pub(crate) async fn auth_options()
-> Result<Json<AuthenticationOptions>, (StatusCode, Json<Value>)> {
    let options = handle_start_authentication_core()
        .await
        .into_response_error()?;

    Ok(Json(options))
}

/// POST /passkeys/auth/verify: on success the response carries the bearer
/// token every admin call presents from now on.
pub(crate) async fn auth_verify(
    Json(auth_response): Json<AuthenticatorResponse>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let session_token = handle_finish_authentication_core(auth_response)
        .await
        .into_response_error()?;

    Ok(Json(json!({ "success": true, "sessionToken": session_token })))
}

/// POST /logout: mounted behind the auth gate, so the token seen here has
/// already been validated.
pub(crate) async fn logout(
    headers: HeaderMap,
    uri: Uri,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let Some(token) = session_token_from_parts(&headers, uri.query()) else {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        ));
    };

    handle_logout_core(&token).await.into_response_error()?;

    Ok(Json(json!({ "success": true })))
}

/// GET /session: probe the admin UI calls on load to learn whether its
/// stored token is still alive. Mounted behind the auth gate.
pub(crate) async fn session_probe() -> Json<Value> {
    Json(json!({ "authenticated": true }))
}
