//! Token codec.
//!
//! Transport form: `base64(header) "." base64(claims) "." base64(signature)`,
//! standard alphabet with padding. The header is always
//! `{"alg":"HS256","typ":"JWT"}` byte for byte and the signature segment is a
//! placeholder (`mock-signature-<handle>`): nothing here signs or verifies.
//!
//! Decoding checks structure only (segment count, claims encoding and JSON
//! shape). Expiry is checked by `validate_claims`.

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use thiserror::Error;

use crate::TokenClaims;

/// Fixed header segment, before transport encoding.
pub const HEADER_JSON: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

const SEGMENT_COUNT: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("claims could not be serialized: {0}")]
    Encode(String),

    #[error("token lifetime puts the expiry out of range")]
    ExpiryOutOfRange,
}

impl TokenError {
    fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Serialize claims into the three-segment transport string.
pub fn encode(claims: &TokenClaims) -> Result<String, TokenError> {
    let claims_json =
        serde_json::to_vec(claims).map_err(|e| TokenError::Encode(e.to_string()))?;

    Ok(format!(
        "{}.{}.{}",
        STANDARD.encode(HEADER_JSON),
        STANDARD.encode(claims_json),
        STANDARD.encode(signature_placeholder(&claims.handle)),
    ))
}

/// Parse claims back out of a transport string.
///
/// Fails with [`TokenError::Malformed`] unless there are exactly three
/// segments and the middle one decodes to claims JSON. The header and
/// signature segments are not inspected.
pub fn decode(token: &str) -> Result<TokenClaims, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != SEGMENT_COUNT {
        return Err(TokenError::malformed(format!(
            "expected {SEGMENT_COUNT} segments, found {}",
            segments.len()
        )));
    }

    let payload = decode_segment(segments[1])?;
    serde_json::from_slice(&payload)
        .map_err(|e| TokenError::malformed(format!("claims segment is not valid claims JSON: {e}")))
}

fn signature_placeholder(handle: &str) -> String {
    format!("mock-signature-{handle}")
}

// Tokens minted elsewhere may use the JWT base64url alphabet without padding.
fn decode_segment(segment: &str) -> Result<Vec<u8>, TokenError> {
    STANDARD
        .decode(segment)
        .or_else(|_| URL_SAFE_NO_PAD.decode(segment))
        .map_err(|e| TokenError::malformed(format!("claims segment is not base64: {e}")))
}
