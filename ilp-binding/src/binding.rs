//! The commitment facade used by the quote and transfer handlers.
//!
//! [`IlpBinding`] owns the secret and chains the components together:
//!
//! ```text
//! quote time:    assemble transaction -> encode packet -> fulfillment -> condition
//! transfer time: decode packet -> recover transaction -> compare amount
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::amount::to_ilp_amount;
use crate::condition::{ConditionGenerator, Fulfillment};
use crate::config::{DEFAULT_ACCOUNT, IlpConfig};
use crate::encoding;
use crate::error::{IlpError, log_rejection};
use crate::packet::{self, IlpPacket};
use crate::transaction::{
    build_transaction_object, decode_transaction_data, encode_transaction_data,
};
use crate::types::{PartialResponse, QuoteRequest, TransactionObject, TransferRequest};
use crate::validator::{self, BindingMismatch};

/// The values added to a quote response.
///
/// `ilp_packet` and `condition` go into the outbound response. `fulfillment`
/// stays with the caller and must not be sent with the quote.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteCommitment {
    /// Base64url fulfillment.
    pub fulfillment: String,
    /// Base64 ILP packet.
    pub ilp_packet: String,
    /// Base64url condition.
    pub condition: String,
}

impl fmt::Debug for QuoteCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuoteCommitment")
            .field("fulfillment", &"<redacted>")
            .field("ilp_packet", &self.ilp_packet)
            .field("condition", &self.condition)
            .finish()
    }
}

/// Outcome of checking an inbound transfer against its packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCheck {
    /// Fulfillment regenerated from the transfer's packet.
    pub fulfillment: Fulfillment,
    /// Whether the transfer's condition is the hash of `fulfillment`.
    pub condition_matches: bool,
    /// First field on which the transfer disagrees with the commitment.
    pub mismatch: Option<BindingMismatch>,
}

impl TransferCheck {
    /// Returns `true` if the condition matches and the amount binding holds.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.condition_matches && self.mismatch.is_none()
    }
}

/// Generates quote commitments and validates transfers against them.
///
/// All methods take `&self` and the only state is the immutable secret, so a
/// single instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct IlpBinding {
    generator: ConditionGenerator,
    account: String,
}

impl IlpBinding {
    /// Creates a binding with the default placeholder account.
    ///
    /// # Errors
    ///
    /// Returns [`IlpError::MissingSecret`] if `secret` is empty.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, IlpError> {
        Ok(Self {
            generator: ConditionGenerator::new(secret)?,
            account: DEFAULT_ACCOUNT.to_owned(),
        })
    }

    /// Creates a binding from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IlpError::MissingSecret`] for an empty secret and
    /// [`IlpError::InvalidAddress`] for an invalid account.
    pub fn from_config(config: &IlpConfig) -> Result<Self, IlpError> {
        Self::new(&config.secret)?.with_account(&config.account)
    }

    /// Replaces the packet account.
    ///
    /// # Errors
    ///
    /// Returns [`IlpError::InvalidAddress`] if `account` is not an ILP address.
    pub fn with_account(mut self, account: impl Into<String>) -> Result<Self, IlpError> {
        let account = account.into();
        packet::validate_address(&account)?;
        self.account = account;
        Ok(self)
    }

    /// Returns the account written into generated packets.
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Produces the packet, condition and fulfillment for a quote response.
    ///
    /// # Errors
    ///
    /// - [`IlpError::MissingField`] if the quote or response lacks a required field
    /// - [`IlpError::InvalidAmount`] if the transfer amount cannot be scaled
    /// - [`IlpError::PayloadTooLarge`] if the transaction object is too large
    #[cfg_attr(
        feature = "telemetry",
        tracing::instrument(name = "ilp.generate_quote_response_commitment", skip_all)
    )]
    pub fn generate_quote_response_commitment(
        &self,
        quote: &QuoteRequest,
        response: &PartialResponse,
    ) -> Result<QuoteCommitment, IlpError> {
        let (transaction, bytes) = self
            .build_packet(quote, response)
            .inspect_err(log_rejection)?;

        let fulfillment = self.generator.derive_fulfillment(&bytes);
        let condition = fulfillment.condition();

        #[cfg(feature = "telemetry")]
        tracing::debug!(
            transaction_id = %transaction.transaction_id,
            quote_id = %transaction.quote_id,
            condition = %condition,
            packet_len = bytes.len(),
            "Generated quote commitment"
        );

        Ok(QuoteCommitment {
            fulfillment: fulfillment.to_base64url(),
            ilp_packet: encoding::encode_packet(&bytes),
            condition: condition.to_base64url(),
        })
    }

    fn build_packet(
        &self,
        quote: &QuoteRequest,
        response: &PartialResponse,
    ) -> Result<(TransactionObject, Vec<u8>), IlpError> {
        let transaction = build_transaction_object(quote, response)?;
        let data = encode_transaction_data(&transaction)?;
        let amount = to_ilp_amount(&transaction.amount)?;
        let bytes = packet::encode(&amount, &self.account, &data)?;
        Ok((transaction, bytes))
    }

    /// Regenerates the fulfillment for a base64 packet.
    ///
    /// # Errors
    ///
    /// Returns [`IlpError::Decode`] if the text is not a well-formed packet.
    pub fn calculate_fulfillment(&self, ilp_packet: &str) -> Result<Fulfillment, IlpError> {
        let bytes = encoding::decode_packet(ilp_packet)?;
        packet::decode(&bytes)?;
        Ok(self.generator.derive_fulfillment(&bytes))
    }

    /// Computes the base64url condition of a base64url fulfillment.
    ///
    /// # Errors
    ///
    /// Returns [`IlpError::InvalidFulfillment`] if the fulfillment is malformed.
    pub fn calculate_condition(&self, fulfillment: &str) -> Result<String, IlpError> {
        ConditionGenerator::calculate_condition(fulfillment)
    }

    /// Checks that a base64url fulfillment hashes to a base64url condition.
    #[must_use]
    pub fn validate_fulfillment(&self, fulfillment: &str, condition: &str) -> bool {
        ConditionGenerator::validate_fulfillment(fulfillment, condition)
    }

    /// Decodes a base64 packet.
    ///
    /// # Errors
    ///
    /// Returns [`IlpError::Decode`] for malformed input.
    pub fn decode_packet(&self, ilp_packet: &str) -> Result<IlpPacket, IlpError> {
        validator::decode_packet(ilp_packet)
    }

    /// Recovers the transaction object committed to by a base64 packet.
    ///
    /// # Errors
    ///
    /// Returns [`IlpError::Decode`] or [`IlpError::MalformedPayload`].
    pub fn get_transaction_object(&self, ilp_packet: &str) -> Result<TransactionObject, IlpError> {
        validator::get_transaction_object(ilp_packet)
    }

    /// Checks that a transfer's amount and currency match its packet.
    ///
    /// # Errors
    ///
    /// Returns [`IlpError::Decode`] or [`IlpError::MalformedPayload`] if the
    /// transfer's packet cannot be read.
    pub fn validate_against_transfer(&self, transfer: &TransferRequest) -> Result<bool, IlpError> {
        validator::validate_against_transfer(transfer)
    }

    /// Regenerates the fulfillment for a transfer and checks both its
    /// condition and its amount binding.
    ///
    /// A transfer whose packet was not issued with this secret reports
    /// `condition_matches == false`.
    ///
    /// # Errors
    ///
    /// Returns [`IlpError::Decode`] or [`IlpError::MalformedPayload`] if the
    /// transfer's packet cannot be read.
    #[cfg_attr(
        feature = "telemetry",
        tracing::instrument(name = "ilp.check_transfer", skip_all)
    )]
    pub fn check_transfer(&self, transfer: &TransferRequest) -> Result<TransferCheck, IlpError> {
        let (bytes, transaction) = open_transfer(transfer).inspect_err(log_rejection)?;
        let fulfillment = self.generator.derive_fulfillment(&bytes);
        let condition_matches = ConditionGenerator::validate_fulfillment(
            &fulfillment.to_base64url(),
            &transfer.condition,
        );
        let mismatch = validator::find_mismatch(&transaction.amount, &transfer.amount);

        #[cfg(feature = "telemetry")]
        tracing::debug!(
            transaction_id = %transaction.transaction_id,
            condition_matches,
            mismatch = ?mismatch,
            "Checked transfer against packet"
        );

        Ok(TransferCheck {
            fulfillment,
            condition_matches,
            mismatch,
        })
    }
}

/// Decodes a transfer's packet and the transaction object it carries.
fn open_transfer(transfer: &TransferRequest) -> Result<(Vec<u8>, TransactionObject), IlpError> {
    let bytes = encoding::decode_packet(&transfer.ilp_packet)?;
    let decoded = packet::decode(&bytes)?;
    let transaction = decode_transaction_data(&decoded.data)?;
    Ok((bytes, transaction))
}
