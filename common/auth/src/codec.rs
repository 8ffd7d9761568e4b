//! Compact three-segment envelope: `base64url(header).base64url(payload).base64url(signature)`.
//!
//! The codec knows nothing about claims or time. Signatures are always computed over
//! the encoded `header.payload` text, and a decoded token keeps the segments exactly as
//! presented so verification never depends on re-encoding decoded bytes.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, NO_PAD};
use base64::Engine;
use hmac::Mac;

use crate::config::Secret;
use crate::error::{AuthError, AuthResult};

/// Fixed JOSE header shared by every issued token.
pub const HEADER_JSON: &[u8] = br#"{"alg":"HS256","typ":"JWT"}"#;

const SEPARATOR: char = '.';

/// Unpadded base64url. Trailing bits in the final symbol are tolerated on decode.
const SEGMENT_ENGINE: GeneralPurpose =
    GeneralPurpose::new(&alphabet::URL_SAFE, NO_PAD.with_decode_allow_trailing_bits(true));

/// A decoded token: raw bytes of each segment plus the presented text the signature
/// is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParts<'a> {
    /// `header.payload` exactly as it appeared in the token.
    pub signing_input: &'a str,
    /// Signature segment exactly as it appeared in the token.
    pub encoded_signature: &'a str,
    pub header: Vec<u8>,
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

pub fn encode(header: &[u8], payload: &[u8], signature: &[u8]) -> String {
    format!(
        "{}{SEPARATOR}{}",
        signing_input(header, payload),
        encode_segment(signature)
    )
}

pub fn decode(token: &str) -> AuthResult<TokenParts<'_>> {
    let (signing_input, encoded_signature) = token
        .rsplit_once(SEPARATOR)
        .ok_or(AuthError::MalformedToken)?;
    let (header, payload) = signing_input
        .split_once(SEPARATOR)
        .ok_or(AuthError::MalformedToken)?;
    if payload.contains(SEPARATOR) {
        return Err(AuthError::MalformedToken);
    }

    Ok(TokenParts {
        signing_input,
        encoded_signature,
        header: decode_segment(header)?,
        payload: decode_segment(payload)?,
        signature: decode_segment(encoded_signature)?,
    })
}

/// HMAC-SHA256 over the encoded `header.payload` signing input.
pub fn sign(header: &[u8], payload: &[u8], secret: &Secret) -> Vec<u8> {
    sign_input(&signing_input(header, payload), secret)
}

/// HMAC-SHA256 over an already encoded `header.payload` string.
pub fn sign_input(signing_input: &str, secret: &Secret) -> Vec<u8> {
    let mut mac = secret.mac();
    mac.update(signing_input.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

pub fn encode_segment(bytes: &[u8]) -> String {
    SEGMENT_ENGINE.encode(bytes)
}

fn signing_input(header: &[u8], payload: &[u8]) -> String {
    format!(
        "{}{SEPARATOR}{}",
        encode_segment(header),
        encode_segment(payload)
    )
}

fn decode_segment(segment: &str) -> AuthResult<Vec<u8>> {
    if segment.is_empty() {
        return Err(AuthError::MalformedToken);
    }
    SEGMENT_ENGINE
        .decode(segment)
        .map_err(|_| AuthError::MalformedToken)
}
