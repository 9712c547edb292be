use ciborium::value::{Integer, Value as CborValue};
use ring::{digest, signature::UnparsedPublicKey};

use crate::passkey::config::{PASSKEY_RP_ID, PASSKEY_USER_VERIFICATION};
use crate::passkey::errors::PasskeyError;
use crate::utils::{base64url_decode, base64url_encode};

use super::types::AttestationObject;

pub(super) fn parse_attestation_object(
    attestation_base64: &str,
) -> Result<AttestationObject, PasskeyError> {
    let attestation_bytes = base64url_decode(attestation_base64)
        .map_err(|e| PasskeyError::Format(format!("Failed to decode attestation object: {e}")))?;

    let attestation_cbor: CborValue = ciborium::de::from_reader(&attestation_bytes[..])
        .map_err(|e| PasskeyError::Format(format!("Invalid CBOR data: {e}")))?;

    let CborValue::Map(map) = attestation_cbor else {
        return Err(PasskeyError::Format(
            "Invalid attestation format".to_string(),
        ));
    };

    let mut fmt = None;
    let mut auth_data = None;
    let mut att_stmt = None;

    for (key, value) in map {
        if let CborValue::Text(k) = key {
            match k.as_str() {
                "fmt" => {
                    if let CborValue::Text(f) = value {
                        fmt = Some(f);
                    }
                }
                "authData" => {
                    if let CborValue::Bytes(data) = value {
                        auth_data = Some(data);
                    }
                }
                "attStmt" => {
                    if let CborValue::Map(stmt) = value {
                        att_stmt = Some(stmt);
                    }
                }
                _ => {}
            }
        }
    }

    match (fmt, auth_data, att_stmt) {
        (Some(f), Some(d), Some(s)) => Ok(AttestationObject {
            fmt: f,
            auth_data: d,
            att_stmt: s,
        }),
        _ => Err(PasskeyError::Format(
            "Missing required attestation data".to_string(),
        )),
    }
}

/// Verify the attestation object against the client data.
///
/// Platform authenticators producing passkeys use the "none" format; the
/// "packed" format is accepted for self-attestation only. Certificate-chain
/// attestation (x5c) is out of scope for a single-admin deployment.
pub(super) fn verify_attestation(
    attestation: &AttestationObject,
    client_data: &[u8],
) -> Result<(), PasskeyError> {
    verify_auth_data_preamble(&attestation.auth_data)?;

    match attestation.fmt.as_str() {
        "none" => {
            tracing::debug!("Using 'none' attestation format");
            verify_none_attestation(attestation)
        }
        "packed" => {
            tracing::debug!("Using 'packed' attestation format");
            let client_data_hash = digest::digest(&digest::SHA256, client_data);
            verify_packed_attestation(attestation, client_data_hash.as_ref())
        }
        _ => Err(PasskeyError::Format(
            "Unsupported attestation format".to_string(),
        )),
    }
}

/// Checks shared across attestation formats: rpIdHash, user presence,
/// user-verification policy, and the attested-credential-data flag.
fn verify_auth_data_preamble(auth_data: &[u8]) -> Result<(), PasskeyError> {
    if auth_data.len() < 37 {
        return Err(PasskeyError::AuthenticatorData(
            "Authenticator data too short".to_string(),
        ));
    }

    let rp_id_hash = digest::digest(&digest::SHA256, PASSKEY_RP_ID.as_bytes());
    if auth_data[..32] != rp_id_hash.as_ref()[..] {
        return Err(PasskeyError::Verification("Invalid RP ID hash".to_string()));
    }

    let flags = auth_data[32];
    let user_present = (flags & 0x01) != 0;
    let user_verified = (flags & 0x04) != 0;
    let has_attested_cred_data = (flags & 0x40) != 0;

    if !user_present {
        return Err(PasskeyError::AuthenticatorData(
            "User Present flag not set".to_string(),
        ));
    }

    if *PASSKEY_USER_VERIFICATION == "required" && !user_verified {
        return Err(PasskeyError::AuthenticatorData(
            "User Verification required but flag not set".to_string(),
        ));
    }

    if !has_attested_cred_data {
        return Err(PasskeyError::AuthenticatorData(
            "No attested credential data".to_string(),
        ));
    }

    Ok(())
}

fn verify_none_attestation(attestation: &AttestationObject) -> Result<(), PasskeyError> {
    // attStmt must be empty for none attestation
    if !attestation.att_stmt.is_empty() {
        return Err(PasskeyError::Format(
            "attStmt must be empty for none attestation".to_string(),
        ));
    }

    // The COSE key must at least parse with valid coordinates
    let (cose_key, _) = parse_attested_credential(&attestation.auth_data)?;
    extract_public_key_coords(&cose_key)?;

    Ok(())
}

/// Packed self-attestation: the signature in attStmt is made with the
/// credential's own key over authData || clientDataHash.
fn verify_packed_attestation(
    attestation: &AttestationObject,
    client_data_hash: &[u8],
) -> Result<(), PasskeyError> {
    let mut alg = None;
    let mut sig = None;

    for (key, value) in &attestation.att_stmt {
        if let CborValue::Text(k) = key {
            match k.as_str() {
                "alg" => {
                    if let CborValue::Integer(a) = value {
                        alg = Some(*a);
                    }
                }
                "sig" => {
                    if let CborValue::Bytes(s) = value {
                        sig = Some(s.clone());
                    }
                }
                "x5c" => {
                    return Err(PasskeyError::Format(
                        "Certificate attestation is not supported".to_string(),
                    ));
                }
                _ => {}
            }
        }
    }

    let alg = alg.ok_or_else(|| PasskeyError::Format("Missing algorithm".to_string()))?;
    if alg != Integer::from(-7) {
        return Err(PasskeyError::Format(
            "Unsupported algorithm, only ES256 is accepted".to_string(),
        ));
    }
    let sig = sig.ok_or_else(|| PasskeyError::Format("Missing signature".to_string()))?;

    let (cose_key, _) = parse_attested_credential(&attestation.auth_data)?;
    let (x_coord, y_coord) = extract_public_key_coords(&cose_key)?;

    let mut public_key = Vec::with_capacity(65);
    public_key.push(0x04);
    public_key.extend_from_slice(&x_coord);
    public_key.extend_from_slice(&y_coord);

    let mut signed_data = Vec::new();
    signed_data.extend_from_slice(&attestation.auth_data);
    signed_data.extend_from_slice(client_data_hash);

    UnparsedPublicKey::new(&ring::signature::ECDSA_P256_SHA256_ASN1, &public_key)
        .verify(&signed_data, &sig)
        .map_err(|_| {
            PasskeyError::Verification("Attestation signature verification failed".to_string())
        })
}

/// Extracted contents of the attested credential data section.
pub(super) struct AttestedCredential {
    pub(super) credential_id: String,
    pub(super) public_key: String,
    pub(super) counter: u32,
}

/// Pull the new credential's ID, public key and initial counter out of the
/// authenticator data.
pub(super) fn extract_attested_credential(
    auth_data: &[u8],
) -> Result<AttestedCredential, PasskeyError> {
    let (cose_key, credential_id_bytes) = parse_attested_credential(auth_data)?;
    let (x_coord, y_coord) = extract_public_key_coords(&cose_key)?;

    let mut public_key = Vec::with_capacity(65);
    public_key.push(0x04); // Uncompressed point format
    public_key.extend_from_slice(&x_coord);
    public_key.extend_from_slice(&y_coord);

    let credential_id = base64url_encode(credential_id_bytes)
        .map_err(|_| PasskeyError::Format("Failed to encode credential ID".to_string()))?;
    let public_key = base64url_encode(public_key)
        .map_err(|_| PasskeyError::Format("Failed to encode public key".to_string()))?;
    let counter = u32::from_be_bytes([auth_data[33], auth_data[34], auth_data[35], auth_data[36]]);

    Ok(AttestedCredential {
        credential_id,
        public_key,
        counter,
    })
}

/// Split the attested credential data into the credential ID and the COSE
/// public key that follows it.
fn parse_attested_credential(auth_data: &[u8]) -> Result<(CborValue, Vec<u8>), PasskeyError> {
    let flags = auth_data.get(32).copied().unwrap_or(0);
    if (flags & 0x40) == 0 {
        return Err(PasskeyError::AuthenticatorData(
            "No attested credential data present".to_string(),
        ));
    }

    let mut pos = 37; // RP ID hash (32) + flags (1) + counter (4)

    if auth_data.len() < pos + 18 {
        return Err(PasskeyError::Format(
            "Authenticator data too short".to_string(),
        ));
    }

    pos += 16; // AAGUID

    let cred_id_len = ((auth_data[pos] as usize) << 8) | (auth_data[pos + 1] as usize);
    pos += 2;

    if cred_id_len == 0 || cred_id_len > 1024 {
        return Err(PasskeyError::Format(
            "Invalid credential ID length".to_string(),
        ));
    }

    if auth_data.len() < pos + cred_id_len {
        return Err(PasskeyError::Format(
            "Authenticator data too short for credential ID".to_string(),
        ));
    }

    let credential_id = auth_data[pos..pos + cred_id_len].to_vec();
    pos += cred_id_len;

    let cose_key: CborValue = ciborium::de::from_reader(&auth_data[pos..])
        .map_err(|e| PasskeyError::Format(format!("Invalid public key CBOR: {e}")))?;

    Ok((cose_key, credential_id))
}

/// Extract the x and y coordinates from a COSE EC2 key.
fn extract_public_key_coords(cose_key: &CborValue) -> Result<(Vec<u8>, Vec<u8>), PasskeyError> {
    let CborValue::Map(map) = cose_key else {
        return Err(PasskeyError::Format(
            "Invalid public key format".to_string(),
        ));
    };

    let mut x_coord = None;
    let mut y_coord = None;

    for (key, value) in map {
        if let CborValue::Integer(i) = key {
            if *i == Integer::from(-2) {
                if let CborValue::Bytes(x) = value {
                    x_coord = Some(x.clone());
                }
            } else if *i == Integer::from(-3) {
                if let CborValue::Bytes(y) = value {
                    y_coord = Some(y.clone());
                }
            }
        }
    }

    match (x_coord, y_coord) {
        (Some(x), Some(y)) if x.len() == 32 && y.len() == 32 => Ok((x, y)),
        (Some(_), Some(_)) => Err(PasskeyError::Format(
            "Invalid key coordinate length".to_string(),
        )),
        _ => Err(PasskeyError::Format(
            "Missing or invalid key coordinates".to_string(),
        )),
    }
}
