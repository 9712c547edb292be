//! A software authenticator for integration tests.
//!
//! Generates a real P-256 keypair and produces attestation and assertion
//! responses in the exact JSON shape a browser would post back, so the
//! ceremonies run against genuine signatures rather than canned blobs.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use ciborium::value::{Integer, Value as CborValue};
use ring::digest;
use ring::rand::SystemRandom;
use ring::signature::{ECDSA_P256_SHA256_ASN1_SIGNING, EcdsaKeyPair, KeyPair};
use serde_json::{Value, json};

const AUTH_FLAG_UP: u8 = 0x01;
const AUTH_FLAG_UV: u8 = 0x04;
const AUTH_FLAG_AT: u8 = 0x40;

pub struct TestAuthenticator {
    key_pair: EcdsaKeyPair,
    raw_credential_id: Vec<u8>,
    /// base64url form, as it appears in credential descriptors
    pub credential_id: String,
    rng: SystemRandom,
}

impl TestAuthenticator {
    pub fn new(credential_id: &[u8]) -> Self {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng)
            .expect("Failed to generate P-256 keypair");
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref(), &rng)
                .expect("Failed to load generated keypair");

        Self {
            key_pair,
            raw_credential_id: credential_id.to_vec(),
            credential_id: URL_SAFE_NO_PAD.encode(credential_id),
            rng,
        }
    }

    /// Response to navigator.credentials.create(): a "none"-format
    /// attestation object embedding this authenticator's public key.
    pub fn attestation_response(&self, rp_id: &str, challenge: &str, origin: &str) -> Value {
        let client_data = client_data_json("webauthn.create", challenge, origin);

        let mut auth_data = auth_data_preamble(rp_id, AUTH_FLAG_UP | AUTH_FLAG_UV | AUTH_FLAG_AT, 0);
        auth_data.extend_from_slice(&[0u8; 16]); // AAGUID
        auth_data.extend_from_slice(&(self.raw_credential_id.len() as u16).to_be_bytes());
        auth_data.extend_from_slice(&self.raw_credential_id);
        auth_data.extend_from_slice(&self.cose_public_key());

        let attestation_object = CborValue::Map(vec![
            (
                CborValue::Text("fmt".to_string()),
                CborValue::Text("none".to_string()),
            ),
            (CborValue::Text("attStmt".to_string()), CborValue::Map(vec![])),
            (
                CborValue::Text("authData".to_string()),
                CborValue::Bytes(auth_data),
            ),
        ]);
        let mut attestation_bytes = Vec::new();
        ciborium::ser::into_writer(&attestation_object, &mut attestation_bytes)
            .expect("Failed to encode attestation object");

        json!({
            "id": self.credential_id,
            "rawId": self.credential_id,
            "type": "public-key",
            "response": {
                "clientDataJSON": URL_SAFE_NO_PAD.encode(client_data),
                "attestationObject": URL_SAFE_NO_PAD.encode(attestation_bytes),
                "transports": ["internal"],
            }
        })
    }

    /// Response to navigator.credentials.get(): an assertion signed with this
    /// authenticator's private key, reporting the given counter.
    pub fn assertion_response(
        &self,
        rp_id: &str,
        challenge: &str,
        origin: &str,
        counter: u32,
    ) -> Value {
        let client_data = client_data_json("webauthn.get", challenge, origin);
        let auth_data = auth_data_preamble(rp_id, AUTH_FLAG_UP | AUTH_FLAG_UV, counter);

        let client_data_hash = digest::digest(&digest::SHA256, &client_data);
        let mut signed_data = Vec::new();
        signed_data.extend_from_slice(&auth_data);
        signed_data.extend_from_slice(client_data_hash.as_ref());

        let signature = self
            .key_pair
            .sign(&self.rng, &signed_data)
            .expect("Failed to sign assertion");

        json!({
            "id": self.credential_id,
            "rawId": self.credential_id,
            "type": "public-key",
            "response": {
                "clientDataJSON": URL_SAFE_NO_PAD.encode(client_data),
                "authenticatorData": URL_SAFE_NO_PAD.encode(auth_data),
                "signature": URL_SAFE_NO_PAD.encode(signature.as_ref()),
                "userHandle": null,
            }
        })
    }

    /// COSE EC2 key (ES256) built from the keypair's uncompressed point.
    fn cose_public_key(&self) -> Vec<u8> {
        let public_key = self.key_pair.public_key().as_ref();
        assert_eq!(public_key.len(), 65, "expected uncompressed P-256 point");
        let x = &public_key[1..33];
        let y = &public_key[33..65];

        let cose_key = CborValue::Map(vec![
            (
                CborValue::Integer(Integer::from(1)), // kty: EC2
                CborValue::Integer(Integer::from(2)),
            ),
            (
                CborValue::Integer(Integer::from(3)), // alg: ES256
                CborValue::Integer(Integer::from(-7)),
            ),
            (
                CborValue::Integer(Integer::from(-1)), // crv: P-256
                CborValue::Integer(Integer::from(1)),
            ),
            (
                CborValue::Integer(Integer::from(-2)),
                CborValue::Bytes(x.to_vec()),
            ),
            (
                CborValue::Integer(Integer::from(-3)),
                CborValue::Bytes(y.to_vec()),
            ),
        ]);

        let mut cose_bytes = Vec::new();
        ciborium::ser::into_writer(&cose_key, &mut cose_bytes)
            .expect("Failed to encode COSE key");
        cose_bytes
    }
}

fn client_data_json(type_: &str, challenge: &str, origin: &str) -> Vec<u8> {
    json!({
        "type": type_,
        "challenge": challenge,
        "origin": origin,
        "crossOrigin": false,
    })
    .to_string()
    .into_bytes()
}

fn auth_data_preamble(rp_id: &str, flags: u8, counter: u32) -> Vec<u8> {
    let rp_id_hash = digest::digest(&digest::SHA256, rp_id.as_bytes());
    let mut auth_data = Vec::new();
    auth_data.extend_from_slice(rp_id_hash.as_ref());
    auth_data.push(flags);
    auth_data.extend_from_slice(&counter.to_be_bytes());
    auth_data
}
