use thiserror::Error;

use crate::passkey::PasskeyError;
use crate::session::SessionError;
use crate::utils::UtilError;

/// Errors that can occur while orchestrating the admin passkey ceremonies.
#[derive(Error, Debug)]
pub enum CoordinationError {
    /// General coordination error
    #[error("Coordination error: {0}")]
    Coordination(String),

    /// Unauthorized access error. Deliberately generic: it never says whether
    /// a secret was wrong, a session expired, or nothing was presented.
    #[error("Unauthorized access")]
    Unauthorized,

    /// Resource not found with context
    #[error("Resource not found: {resource_type} {resource_id}")]
    ResourceNotFound {
        resource_type: String,
        resource_id: String,
    },

    /// Error from Passkey operations
    #[error("Passkey error: {0}")]
    PasskeyError(PasskeyError),

    /// Error from Session operations
    #[error("Session error: {0}")]
    SessionError(SessionError),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    UtilsError(UtilError),
}

impl CoordinationError {
    /// Log the error and return self, allowing for method chaining when a
    /// variant is constructed in place rather than converted.
    pub fn log(self) -> Self {
        match &self {
            Self::Coordination(msg) => tracing::error!("Coordination error: {}", msg),
            Self::Unauthorized => tracing::error!("Unauthorized access"),
            Self::ResourceNotFound {
                resource_type,
                resource_id,
            } => tracing::error!("Resource not found: {} {}", resource_type, resource_id),
            Self::PasskeyError(err) => tracing::error!("Passkey error: {}", err),
            Self::SessionError(err) => tracing::error!("Session error: {}", err),
            Self::UtilsError(err) => tracing::error!("Utils error: {}", err),
        }
        self
    }
}

// Custom From implementations that automatically log errors

impl From<PasskeyError> for CoordinationError {
    fn from(err: PasskeyError) -> Self {
        let error = Self::PasskeyError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<SessionError> for CoordinationError {
    fn from(err: SessionError) -> Self {
        let error = Self::SessionError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<UtilError> for CoordinationError {
    fn from(err: UtilError) -> Self {
        let error = Self::UtilsError(err);
        tracing::error!("{}", error);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_sync_and_send() {
        fn assert_sync_send<T: Sync + Send>() {}
        assert_sync_send::<CoordinationError>();
    }

    #[test]
    fn test_error_display() {
        let err = CoordinationError::Coordination("test error".to_string());
        assert_eq!(err.to_string(), "Coordination error: test error");

        let err = CoordinationError::Unauthorized;
        assert_eq!(err.to_string(), "Unauthorized access");

        let err = CoordinationError::ResourceNotFound {
            resource_type: "passkey".to_string(),
            resource_id: "any".to_string(),
        };
        assert_eq!(err.to_string(), "Resource not found: passkey any");
    }

    #[test]
    fn test_from_passkey_error() {
        let passkey_err = PasskeyError::Storage("passkey storage error".to_string());
        let err: CoordinationError = passkey_err.into();

        match err {
            CoordinationError::PasskeyError(PasskeyError::Storage(msg)) => {
                assert_eq!(msg, "passkey storage error");
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_from_session_error() {
        let session_err = SessionError::Storage("session storage error".to_string());
        let err: CoordinationError = session_err.into();

        match err {
            CoordinationError::SessionError(SessionError::Storage(msg)) => {
                assert_eq!(msg, "session storage error");
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_error_log_returns_self() {
        let err = CoordinationError::Coordination("test error".to_string());
        let logged_err = err.log();

        match logged_err {
            CoordinationError::Coordination(msg) => assert_eq!(msg, "test error"),
            _ => panic!("Wrong error type after logging"),
        }
    }
}
