//! Verification of the `signed_payload` BigCommerce attaches to app callbacks.
//!
//! Wire format: `base64(payload_json) + "." + base64(hex(hmac_sha256(payload_json, client_secret)))`.
//!
//! A payload is either fully verified or rejected; no partially trusted data
//! leaves this module.

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use bigcommerce_core::{StoreHash, UserId};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

/// Standard alphabet, accepting input with or without padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Which half of the signed payload failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// The JSON claims.
    Payload,
    /// The hex-encoded HMAC.
    Signature,
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Payload => "payload",
            Self::Signature => "signature",
        })
    }
}

/// Errors that reject a signed payload.
#[derive(Debug, Error)]
pub enum SignedPayloadError {
    /// No payload was supplied.
    #[error("signed payload is missing")]
    MissingPayload,

    /// The payload is not two `.`-separated segments.
    #[error("signed payload is malformed")]
    MalformedPayload,

    /// A segment is not valid base64.
    #[error("signed payload {segment} is not valid base64: {source}")]
    Decode {
        /// The offending segment.
        segment: Segment,
        /// Underlying decode error.
        #[source]
        source: base64::DecodeError,
    },

    /// The signature does not match the payload.
    #[error("signed payload signature mismatch")]
    SignatureMismatch,

    /// The client secret cannot be used as an HMAC key.
    #[error("client secret cannot be used as an HMAC key")]
    InvalidKey,

    /// The verified payload is not the expected JSON document.
    #[error("signed payload claims are invalid: {0}")]
    InvalidClaims(#[from] serde_json::Error),
}

/// A user referenced by a signed payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadUser {
    /// BigCommerce user id.
    pub id: UserId,
    /// Login email.
    #[serde(default)]
    pub email: String,
}

/// Claims carried by a verified signed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedPayloadClaims {
    /// The user opening the app.
    #[serde(default)]
    pub user: PayloadUser,
    /// The store owner.
    #[serde(default)]
    pub owner: PayloadUser,
    /// `stores/{hash}`.
    #[serde(default)]
    pub context: String,
    /// The store the callback concerns.
    pub store_hash: StoreHash,
    /// Seconds since the epoch at signing time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    /// Deep-link path inside the app.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Verify a signed payload and return the decoded payload bytes.
///
/// # Errors
///
/// - [`SignedPayloadError::MissingPayload`] for an empty string
/// - [`SignedPayloadError::MalformedPayload`] unless there are exactly two segments
/// - [`SignedPayloadError::Decode`] when a segment is not base64
/// - [`SignedPayloadError::SignatureMismatch`] when the HMAC differs
pub fn verify_signed_payload(
    signed_payload: &str,
    client_secret: &SecretString,
) -> Result<Vec<u8>, SignedPayloadError> {
    if signed_payload.is_empty() {
        return Err(SignedPayloadError::MissingPayload);
    }

    let mut segments = signed_payload.split('.');
    let (Some(encoded_payload), Some(encoded_signature), None) =
        (segments.next(), segments.next(), segments.next())
    else {
        return Err(SignedPayloadError::MalformedPayload);
    };

    let payload = PAYLOAD_ENGINE
        .decode(encoded_payload)
        .map_err(|source| SignedPayloadError::Decode {
            segment: Segment::Payload,
            source,
        })?;
    let signature = PAYLOAD_ENGINE
        .decode(encoded_signature)
        .map_err(|source| SignedPayloadError::Decode {
            segment: Segment::Signature,
            source,
        })?;

    let expected = hex_hmac(&payload, client_secret)?;
    if !constant_time_eq(expected.as_bytes(), &signature) {
        debug!("signed payload rejected");
        return Err(SignedPayloadError::SignatureMismatch);
    }

    Ok(payload)
}

/// Verify a signed payload and decode its claims.
///
/// # Errors
///
/// Everything [`verify_signed_payload`] returns, plus
/// [`SignedPayloadError::InvalidClaims`] when the payload is not a claims
/// document.
pub fn verify_claims(
    signed_payload: &str,
    client_secret: &SecretString,
) -> Result<SignedPayloadClaims, SignedPayloadError> {
    let payload = verify_signed_payload(signed_payload, client_secret)?;
    Ok(serde_json::from_slice(&payload)?)
}

/// Produce a signed payload in BigCommerce's wire format.
///
/// # Errors
///
/// Returns [`SignedPayloadError::InvalidKey`] if the secret is rejected as
/// an HMAC key.
pub fn sign_payload(
    payload: &[u8],
    client_secret: &SecretString,
) -> Result<String, SignedPayloadError> {
    let signature = hex_hmac(payload, client_secret)?;
    Ok(format!(
        "{}.{}",
        STANDARD.encode(payload),
        STANDARD.encode(signature)
    ))
}

fn hex_hmac(payload: &[u8], client_secret: &SecretString) -> Result<String, SignedPayloadError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(client_secret.expose_secret().as_bytes())
        .map_err(|_| SignedPayloadError::InvalidKey)?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Compare without short-circuiting on content.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b) {
        result |= x ^ y;
    }

    result == 0
}
