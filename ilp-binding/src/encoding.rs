//! Base64 text encodings used on the wire.
//!
//! Packets travel as standard base64; fulfillments, conditions and the
//! embedded transaction payload use unpadded base64url. Decoding is lenient
//! about padding, and packet decoding also accepts the URL-safe alphabet since
//! intermediaries re-encode packets either way.

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::STANDARD as b64;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::error::DecodeError;

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_encode_padding(false)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Encodes packet bytes as padded standard base64.
#[must_use]
pub fn encode_packet<T: AsRef<[u8]>>(input: T) -> String {
    b64.encode(input.as_ref())
}

/// Decodes a textual packet in either base64 alphabet, padded or not.
///
/// # Errors
///
/// Returns [`DecodeError::Base64`] if the text is not valid base64.
pub fn decode_packet(input: &str) -> Result<Vec<u8>, DecodeError> {
    let trimmed = input.trim();
    let engine = if trimmed.contains(['-', '_']) {
        &URL_SAFE_LENIENT
    } else {
        &STANDARD_LENIENT
    };
    engine
        .decode(trimmed)
        .map_err(|e| DecodeError::Base64(e.to_string()))
}

/// Encodes bytes as unpadded base64url.
#[must_use]
pub fn encode_url<T: AsRef<[u8]>>(input: T) -> String {
    URL_SAFE_LENIENT.encode(input.as_ref())
}

/// Decodes base64url text, padded or not.
///
/// # Errors
///
/// Returns an error if the data is not valid base64url.
pub fn decode_url<T: AsRef<[u8]>>(input: T) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_LENIENT.decode(input.as_ref())
}
