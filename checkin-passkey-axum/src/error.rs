use axum::Json;
use http::StatusCode;
use serde_json::{Value, json};

use checkin_passkey::{CoordinationError, PasskeyError, SessionError};

/// Helper trait for converting errors to a standard `{ "error": … }` JSON
/// response with the right status code.
pub(super) trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, Json<Value>)>;
}

impl<T> IntoResponseError<T> for Result<T, CoordinationError> {
    fn into_response_error(self) -> Result<T, (StatusCode, Json<Value>)> {
        self.map_err(|e| {
            let status = match &e {
                CoordinationError::Unauthorized => StatusCode::UNAUTHORIZED,
                CoordinationError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
                // An assertion naming a credential not on file is an
                // authorization failure, not a malformed request
                CoordinationError::PasskeyError(PasskeyError::NotFound(_)) => {
                    StatusCode::UNAUTHORIZED
                }
                CoordinationError::PasskeyError(PasskeyError::Storage(_)) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                CoordinationError::PasskeyError(_) => StatusCode::BAD_REQUEST,
                CoordinationError::SessionError(SessionError::SessionError) => {
                    StatusCode::UNAUTHORIZED
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(json!({ "error": e.to_string() })))
        })
    }
}
