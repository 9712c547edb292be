use thiserror::Error;

use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// Deliberately opaque: unknown, expired and revoked tokens all surface
    /// the same way so a caller cannot tell which case occurred.
    #[error("Session error")]
    SessionError,

    #[error("Storage error: {0}")]
    Storage(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_is_opaque_for_invalid_tokens() {
        let err = SessionError::SessionError;
        assert_eq!(err.to_string(), "Session error");
    }

    #[test]
    fn test_error_is_sync_and_send() {
        fn assert_sync_send<T: Sync + Send>() {}
        assert_sync_send::<SessionError>();
    }
}
