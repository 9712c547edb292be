use axum::{
    Json,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::session::session_token_from_parts;

/// Gate for admin-only routes.
///
/// A request without a live session token is answered 401 before the handler
/// runs; a valid one passes through untouched (no sliding expiry). The
/// response never says whether the token was missing, unknown, or expired.
pub async fn require_admin_session(req: Request, next: Next) -> Response {
    let token = session_token_from_parts(req.headers(), req.uri().query());

    let Some(token) = token else {
        tracing::debug!("Admin request without session token");
        return unauthorized();
    };

    match checkin_passkey::validate_session(&token).await {
        Ok(()) => next.run(req).await,
        Err(_) => unauthorized(),
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Unauthorized" })),
    )
        .into_response()
}
