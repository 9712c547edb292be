use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::SessionError;
use crate::storage::CacheData;

/// Session entry as it sits in the cache store, keyed by the bearer token.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub(super) struct StoredSession {
    pub(super) expires_at: DateTime<Utc>,
}

impl From<StoredSession> for CacheData {
    fn from(data: StoredSession) -> Self {
        Self {
            value: serde_json::to_string(&data).expect("Failed to serialize StoredSession"),
        }
    }
}

impl TryFrom<CacheData> for StoredSession {
    type Error = SessionError;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        serde_json::from_str(&data.value).map_err(|e| SessionError::Storage(e.to_string()))
    }
}
