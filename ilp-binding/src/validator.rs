//! Transfer-time checks against a previously issued packet.
//!
//! A transfer is structurally broken when its packet does not decode or its
//! payload does not parse; both are errors. A transfer that decodes cleanly but
//! names a different amount or currency than the quote committed to is merely
//! invalid and yields `false`.

use std::fmt;

use crate::encoding;
use crate::error::{IlpError, log_rejection};
use crate::packet::{self, IlpPacket};
use crate::transaction::decode_transaction_data;
use crate::types::{Money, TransactionObject, TransferRequest};

/// A field on which a transfer disagrees with its committed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMismatch {
    /// The amount strings differ.
    Amount,
    /// The currency codes differ.
    Currency,
}

impl BindingMismatch {
    /// Wire name of the mismatching field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Amount => "amount.amount",
            Self::Currency => "amount.currency",
        }
    }
}

impl fmt::Display for BindingMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} does not match the committed transaction", self.field())
    }
}

/// Decodes a base64 packet.
///
/// # Errors
///
/// Returns [`IlpError::Decode`] if the text is not base64 or the bytes are
/// not an ILP payment packet.
pub fn decode_packet(ilp_packet: &str) -> Result<IlpPacket, IlpError> {
    let bytes = encoding::decode_packet(ilp_packet)?;
    Ok(packet::decode(&bytes)?)
}

/// Recovers the transaction object committed to by a base64 packet.
///
/// # Errors
///
/// Returns [`IlpError::Decode`] for a malformed packet and
/// [`IlpError::MalformedPayload`] if the packet data is not a transaction
/// object.
pub fn get_transaction_object(ilp_packet: &str) -> Result<TransactionObject, IlpError> {
    let packet = decode_packet(ilp_packet)?;
    decode_transaction_data(&packet.data)
}

/// Compares a transfer amount with the committed one.
///
/// Both fields use exact string equality: `"100"` and `"100.00"` differ.
/// The amount is checked first.
#[must_use]
pub fn find_mismatch(committed: &Money, transfer: &Money) -> Option<BindingMismatch> {
    if committed.amount != transfer.amount {
        Some(BindingMismatch::Amount)
    } else if committed.currency != transfer.currency {
        Some(BindingMismatch::Currency)
    } else {
        None
    }
}

/// Checks that a transfer still carries the amount and currency committed to
/// by its packet.
///
/// Payer and payee identities are not compared.
///
/// # Errors
///
/// Returns [`IlpError::Decode`] or [`IlpError::MalformedPayload`] when the
/// transfer's packet cannot be read; a readable but inconsistent transfer
/// returns `Ok(false)`.
#[cfg_attr(
    feature = "telemetry",
    tracing::instrument(name = "ilp.validate_against_transfer", skip_all)
)]
pub fn validate_against_transfer(transfer: &TransferRequest) -> Result<bool, IlpError> {
    let transaction = get_transaction_object(&transfer.ilp_packet).inspect_err(log_rejection)?;
    match find_mismatch(&transaction.amount, &transfer.amount) {
        None => Ok(true),
        Some(_mismatch) => {
            #[cfg(feature = "telemetry")]
            tracing::debug!(
                transaction_id = %transaction.transaction_id,
                field = _mismatch.field(),
                "Transfer does not match committed transaction"
            );
            Ok(false)
        }
    }
}
