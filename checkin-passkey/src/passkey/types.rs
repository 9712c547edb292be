use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::PasskeyError;
use crate::storage::CacheData;

/// What a challenge was issued for. A challenge minted for one ceremony can
/// never be consumed by the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengePurpose {
    Register,
    Authenticate,
}

impl std::fmt::Display for ChallengePurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Register => write!(f, "register"),
            Self::Authenticate => write!(f, "authenticate"),
        }
    }
}

/// Challenge entry as it sits in the cache store, keyed by the challenge
/// value itself.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub(super) struct StoredChallenge {
    pub(super) purpose: ChallengePurpose,
    pub(super) expires_at: DateTime<Utc>,
}

impl From<StoredChallenge> for CacheData {
    fn from(data: StoredChallenge) -> Self {
        Self {
            value: serde_json::to_string(&data).expect("Failed to serialize StoredChallenge"),
        }
    }
}

impl TryFrom<CacheData> for StoredChallenge {
    type Error = PasskeyError;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        serde_json::from_str(&data.value).map_err(|e| PasskeyError::Storage(e.to_string()))
    }
}

/// Stored credential information for an admin passkey.
///
/// Contains everything needed to verify later authentications with the same
/// credential: the public key, the credential ID and the signature counter.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct StoredCredential {
    /// Credential ID, base64url-encoded
    pub credential_id: String,
    /// Uncompressed P-256 public key, base64url-encoded
    pub public_key: String,
    /// Signature counter reported by the authenticator; used to detect clones
    pub counter: u32,
    /// Transport hints reported at registration, if any
    pub transports: Option<Vec<String>>,
    /// When the credential was created
    pub created_at: DateTime<Utc>,
    /// When the credential was last updated
    pub updated_at: DateTime<Utc>,
}
