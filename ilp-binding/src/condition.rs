//! Fulfillment and condition derivation.
//!
//! A fulfillment is `HMAC-SHA256(secret, packet)`; its condition is
//! `SHA-256(fulfillment)`. Both are 32 bytes and travel as unpadded base64url.
//! Derivation is deterministic: the same secret and packet bytes always give
//! the same pair, so the payee can regenerate the fulfillment from the packet
//! alone when the transfer arrives.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::encoding::{decode_url, encode_url};
use crate::error::IlpError;

type HmacSha256 = Hmac<Sha256>;

/// Size in bytes of fulfillments and conditions.
pub const PREIMAGE_LENGTH: usize = 32;

/// The secret preimage of a [`Condition`].
#[derive(Clone, PartialEq, Eq)]
pub struct Fulfillment([u8; PREIMAGE_LENGTH]);

impl Fulfillment {
    /// Wraps raw fulfillment bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; PREIMAGE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parses a base64url fulfillment.
    ///
    /// # Errors
    ///
    /// Returns [`IlpError::InvalidFulfillment`] if the text is not base64url
    /// or does not decode to exactly 32 bytes.
    pub fn from_base64url(text: &str) -> Result<Self, IlpError> {
        decode_preimage(text)
            .map(Self)
            .map_err(IlpError::InvalidFulfillment)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; PREIMAGE_LENGTH] {
        &self.0
    }

    /// Returns the unpadded base64url encoding.
    #[must_use]
    pub fn to_base64url(&self) -> String {
        encode_url(self.0)
    }

    /// Computes the condition committing to this fulfillment.
    #[must_use]
    pub fn condition(&self) -> Condition {
        Condition(Sha256::digest(self.0).into())
    }
}

impl fmt::Debug for Fulfillment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Fulfillment(<redacted>)")
    }
}

/// SHA-256 hash of a [`Fulfillment`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Condition([u8; PREIMAGE_LENGTH]);

impl Condition {
    /// Parses a base64url condition.
    ///
    /// Returns `None` if the text is not base64url or not 32 bytes long.
    #[must_use]
    pub fn from_base64url(text: &str) -> Option<Self> {
        decode_preimage(text).ok().map(Self)
    }

    /// Returns the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; PREIMAGE_LENGTH] {
        &self.0
    }

    /// Returns the unpadded base64url encoding.
    #[must_use]
    pub fn to_base64url(&self) -> String {
        encode_url(self.0)
    }

    /// Returns `true` if `fulfillment` hashes to this condition.
    #[must_use]
    pub fn is_fulfilled_by(&self, fulfillment: &Fulfillment) -> bool {
        fulfillment.condition() == *self
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Condition({})", self.to_base64url())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64url())
    }
}

fn decode_preimage(text: &str) -> Result<[u8; PREIMAGE_LENGTH], String> {
    let bytes = decode_url(text).map_err(|e| e.to_string())?;
    <[u8; PREIMAGE_LENGTH]>::try_from(bytes.as_slice())
        .map_err(|_| format!("expected {PREIMAGE_LENGTH} bytes, got {}", bytes.len()))
}

/// Derives fulfillments from packets with a fixed secret.
///
/// Holds nothing but the key, which is never mutated, so one generator can
/// be shared across threads.
#[derive(Clone)]
pub struct ConditionGenerator {
    secret: Vec<u8>,
}

impl fmt::Debug for ConditionGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionGenerator")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl ConditionGenerator {
    /// Creates a generator keyed with `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`IlpError::MissingSecret`] if `secret` is empty.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, IlpError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(IlpError::MissingSecret);
        }
        Ok(Self {
            secret: secret.to_vec(),
        })
    }

    /// Computes `HMAC-SHA256(secret, packet)`.
    #[must_use]
    pub fn derive_fulfillment(&self, packet: &[u8]) -> Fulfillment {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size");
        mac.update(packet);
        Fulfillment(mac.finalize().into_bytes().into())
    }

    /// Computes the condition of a fulfillment.
    #[must_use]
    pub fn derive_condition(fulfillment: &Fulfillment) -> Condition {
        fulfillment.condition()
    }

    /// Computes the base64url condition of a base64url fulfillment.
    ///
    /// # Errors
    ///
    /// Returns [`IlpError::InvalidFulfillment`] if the fulfillment is not
    /// base64url or not 32 bytes long.
    pub fn calculate_condition(fulfillment: &str) -> Result<String, IlpError> {
        Ok(Fulfillment::from_base64url(fulfillment)?
            .condition()
            .to_base64url())
    }

    /// Checks that `fulfillment` hashes to `condition`.
    ///
    /// Both are base64url text and are compared as decoded bytes. Malformed
    /// input of either kind yields `false`.
    #[must_use]
    pub fn validate_fulfillment(fulfillment: &str, condition: &str) -> bool {
        let Ok(fulfillment) = Fulfillment::from_base64url(fulfillment) else {
            return false;
        };
        Condition::from_base64url(condition).is_some_and(|c| c.is_fulfilled_by(&fulfillment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            ConditionGenerator::new("").unwrap_err(),
            IlpError::MissingSecret
        ));
        assert!(ConditionGenerator::new(Vec::<u8>::new()).is_err());
    }

    #[test]
    fn test_fulfillment_is_rfc4231_hmac() {
        // RFC 4231 test case 2
        let generator = ConditionGenerator::new("Jefe").unwrap();
        let fulfillment = generator.derive_fulfillment(b"what do ya want for nothing?");
        let expected = [
            0x5b, 0xdc, 0xc1, 0x46, 0xbf, 0x60, 0x75, 0x4e, 0x6a, 0x04, 0x24, 0x26, 0x08, 0x95,
            0x75, 0xc7, 0x5a, 0x00, 0x3f, 0x08, 0x9d, 0x27, 0x39, 0x83, 0x9d, 0xec, 0x58, 0xb9,
            0x64, 0xec, 0x38, 0x43,
        ];
        assert_eq!(fulfillment.as_bytes(), &expected);
    }

    #[test]
    fn test_condition_is_sha256_of_fulfillment() {
        let fulfillment = Fulfillment::from_bytes([0u8; 32]);
        // SHA-256 of 32 zero bytes
        assert_eq!(
            fulfillment.condition().to_base64url(),
            "Zmh6rfhivXdsj8GLjp-OIAiXFIVu4jOzkCpZHQ1fKSU"
        );
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let a = ConditionGenerator::new("secret").unwrap();
        let b = ConditionGenerator::new(b"secret".to_vec()).unwrap();
        assert_eq!(a.derive_fulfillment(b"packet"), b.derive_fulfillment(b"packet"));
        assert_ne!(a.derive_fulfillment(b"packet"), a.derive_fulfillment(b"packet2"));

        let other = ConditionGenerator::new("other").unwrap();
        assert_ne!(a.derive_fulfillment(b"packet"), other.derive_fulfillment(b"packet"));
    }

    #[test]
    fn test_validate_fulfillment_accepts_matching_pair() {
        let generator = ConditionGenerator::new("secret").unwrap();
        let fulfillment = generator.derive_fulfillment(b"packet");
        let condition = ConditionGenerator::derive_condition(&fulfillment);
        assert!(ConditionGenerator::validate_fulfillment(
            &fulfillment.to_base64url(),
            &condition.to_base64url()
        ));
        assert_eq!(
            ConditionGenerator::calculate_condition(&fulfillment.to_base64url()).unwrap(),
            condition.to_base64url()
        );
    }

    #[test]
    fn test_validate_fulfillment_rejects_flipped_byte() {
        let generator = ConditionGenerator::new("secret").unwrap();
        let fulfillment = generator.derive_fulfillment(b"packet");
        let condition = fulfillment.condition();
        for i in 0..PREIMAGE_LENGTH {
            let mut bytes = *condition.as_bytes();
            bytes[i] ^= 0x01;
            assert!(!ConditionGenerator::validate_fulfillment(
                &fulfillment.to_base64url(),
                &encode_url(bytes)
            ));
        }
    }

    #[test]
    fn test_validate_fulfillment_is_false_on_malformed_input() {
        let generator = ConditionGenerator::new("secret").unwrap();
        let fulfillment = generator.derive_fulfillment(b"packet").to_base64url();
        let condition = ConditionGenerator::calculate_condition(&fulfillment).unwrap();

        assert!(!ConditionGenerator::validate_fulfillment(&fulfillment, "%%%"));
        assert!(!ConditionGenerator::validate_fulfillment("%%%", &condition));
        assert!(!ConditionGenerator::validate_fulfillment(&fulfillment, &condition[..20]));
        assert!(!ConditionGenerator::validate_fulfillment(&fulfillment[..20], &condition));
        assert!(!ConditionGenerator::validate_fulfillment("", ""));
    }

    #[test]
    fn test_padded_encodings_accepted() {
        let generator = ConditionGenerator::new("secret").unwrap();
        let fulfillment = generator.derive_fulfillment(b"packet");
        let padded = format!("{}=", fulfillment.to_base64url());
        let condition = format!("{}=", fulfillment.condition().to_base64url());
        assert!(ConditionGenerator::validate_fulfillment(&padded, &condition));
    }

    #[test]
    fn test_surrounding_whitespace_rejected() {
        let generator = ConditionGenerator::new("secret").unwrap();
        let fulfillment = generator.derive_fulfillment(b"packet");
        let condition = fulfillment.condition().to_base64url();
        let fulfillment = fulfillment.to_base64url();
        assert!(!ConditionGenerator::validate_fulfillment(
            &fulfillment,
            &format!(" {condition} ")
        ));
        assert!(!ConditionGenerator::validate_fulfillment(
            &format!("{fulfillment}\n"),
            &condition
        ));
    }

    #[test]
    fn test_calculate_condition_rejects_short_fulfillment() {
        let err = ConditionGenerator::calculate_condition(&encode_url([1u8; 16])).unwrap_err();
        assert!(matches!(err, IlpError::InvalidFulfillment(_)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let generator = ConditionGenerator::new("topsecret").unwrap();
        let rendered = format!("{generator:?}");
        assert!(!rendered.contains("topsecret"));
        let fulfillment = generator.derive_fulfillment(b"p");
        assert!(!format!("{fulfillment:?}").contains(&fulfillment.to_base64url()));
    }
}
