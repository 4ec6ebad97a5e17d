//! Error types for ILP commitment generation and transfer validation.
//!
//! Structural problems (missing fields, unparsable packets, bad payloads) are
//! always reported as an [`IlpError`]. A well-formed message that simply does
//! not match its commitment is never an error: validators return `false`.

use serde::{Deserialize, Serialize};

/// Errors raised while building, encoding, decoding or inspecting ILP packets.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum IlpError {
    /// A required field is absent from the quote request or partial response.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The commitment generator was constructed without key material.
    #[error("ILP secret is missing or empty")]
    MissingSecret,

    /// The packet account is not a valid ILP address.
    #[error("invalid ILP address: {0}")]
    InvalidAddress(String),

    /// The packet amount is not a non-negative integer within the UInt64 range.
    #[error("invalid ILP amount: {0}")]
    InvalidAmount(String),

    /// The packet data exceeds the protocol maximum.
    #[error("packet data is {size} bytes, maximum is {max}")]
    PayloadTooLarge {
        /// Size of the rejected payload in bytes.
        size: usize,
        /// Protocol maximum payload size in bytes.
        max: usize,
    },

    /// The packet bytes do not parse as an ILP payment packet.
    #[error("failed to decode ILP packet: {0}")]
    Decode(#[from] DecodeError),

    /// The packet decoded but its data does not hold a transaction object.
    #[error("malformed transaction payload: {0}")]
    MalformedPayload(String),

    /// A fulfillment is not a base64url encoding of exactly 32 bytes.
    #[error("invalid fulfillment: {0}")]
    InvalidFulfillment(String),
}

impl IlpError {
    /// Returns the machine-readable reason for this error.
    #[must_use]
    pub const fn reason(&self) -> ErrorReason {
        match self {
            Self::MissingField(_) => ErrorReason::MissingField,
            Self::MissingSecret => ErrorReason::MissingSecret,
            Self::InvalidAddress(_) => ErrorReason::InvalidAddress,
            Self::InvalidAmount(_) => ErrorReason::InvalidAmount,
            Self::PayloadTooLarge { .. } => ErrorReason::PayloadTooLarge,
            Self::Decode(_) => ErrorReason::DecodeError,
            Self::MalformedPayload(_) => ErrorReason::MalformedPayload,
            Self::InvalidFulfillment(_) => ErrorReason::InvalidFulfillment,
        }
    }
}

/// Logs a rejected input at `debug` together with its reason code.
///
/// Does nothing unless the `telemetry` feature is enabled.
#[cfg_attr(not(feature = "telemetry"), allow(unused_variables))]
pub(crate) fn log_rejection(err: &IlpError) {
    #[cfg(feature = "telemetry")]
    tracing::debug!(reason = %err.reason(), error = %err, "Rejected malformed input");
}

/// Wire-level failures while decoding an ILP packet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The textual packet is not valid base64.
    #[error("invalid base64: {0}")]
    Base64(String),

    /// The buffer ended before a complete structure was read.
    #[error("unexpected end of input while reading {0}")]
    UnexpectedEof(&'static str),

    /// The leading type octet is not an ILP payment packet.
    #[error("unknown packet type {0}")]
    UnknownType(u8),

    /// A length prefix uses a form this codec does not accept.
    #[error("invalid length prefix: {0}")]
    InvalidLength(String),

    /// The envelope length does not match the bytes that follow it.
    #[error("envelope declares {declared} bytes but {actual} remain")]
    LengthMismatch {
        /// Length declared by the envelope prefix.
        declared: usize,
        /// Bytes actually present after the prefix.
        actual: usize,
    },

    /// The account field contains non-ASCII bytes.
    #[error("account is not ASCII")]
    NonAsciiAccount,

    /// The account field is not a valid ILP address.
    #[error("account is not an ILP address: {0}")]
    InvalidAccount(String),

    /// Bytes remain after the structure was fully read.
    #[error("{0} trailing bytes after packet contents")]
    TrailingBytes(usize),
}

/// Machine-readable error reason codes.
///
/// Rendered in `snake_case`, suitable for logs and for mapping onto the
/// error codes of the surrounding transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorReason {
    /// A required input field was absent.
    MissingField,
    /// The generator has no secret.
    MissingSecret,
    /// The ILP address is malformed.
    InvalidAddress,
    /// The ILP amount is malformed.
    InvalidAmount,
    /// The packet data is too large.
    PayloadTooLarge,
    /// The packet could not be decoded.
    DecodeError,
    /// The embedded transaction object could not be parsed.
    MalformedPayload,
    /// The fulfillment is malformed.
    InvalidFulfillment,
}

impl ErrorReason {
    /// Returns the `snake_case` string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::MissingSecret => "missing_secret",
            Self::InvalidAddress => "invalid_address",
            Self::InvalidAmount => "invalid_amount",
            Self::PayloadTooLarge => "payload_too_large",
            Self::DecodeError => "decode_error",
            Self::MalformedPayload => "malformed_payload",
            Self::InvalidFulfillment => "invalid_fulfillment",
        }
    }
}

impl core::fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
