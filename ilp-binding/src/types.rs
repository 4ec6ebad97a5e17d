//! Message types exchanged with the surrounding quote and transfer layer.
//!
//! All types serialize to JSON using camelCase field names, matching the
//! FSPIOP quote and transfer resources. Inputs keep their top-level fields
//! optional so that absence can be reported by name instead of failing
//! deserialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;

/// A currency and a decimal amount, both kept as the sender wrote them.
///
/// Amounts are strings on purpose: `"100"` and `"100.00"` are different
/// commitments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// ISO-4217 currency code.
    pub currency: String,
    /// Decimal amount as a string.
    pub amount: String,
}

impl Money {
    /// Creates a new money value.
    #[must_use]
    pub fn new(currency: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            amount: amount.into(),
        }
    }
}

/// Identifies a party within the scheme.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyIdInfo {
    /// Identifier type, e.g. `MSISDN`.
    pub party_id_type: String,
    /// Identifier value.
    pub party_identifier: String,
    /// Optional sub-identifier or type.
    pub party_sub_id_or_type: Option<String>,
    /// FSP that owns the party.
    pub fsp_id: Option<String>,
    /// Scheme extension list, carried opaquely.
    pub extension_list: Option<Value>,
}

/// Party descriptor for a payer or payee.
///
/// Fields this crate does not model are kept in `extensions` so that the
/// committed transaction object can be reconstructed without loss.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    /// Identification of the party.
    pub party_id_info: PartyIdInfo,
    /// Merchant category code, for merchant payees.
    pub merchant_classification_code: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Personal information, carried opaquely.
    pub personal_info: Option<Value>,
    /// Any other fields present on the wire.
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl Party {
    /// Creates a party from an identifier type and value.
    #[must_use]
    pub fn new(party_id_type: impl Into<String>, party_identifier: impl Into<String>) -> Self {
        Self {
            party_id_info: PartyIdInfo {
                party_id_type: party_id_type.into(),
                party_identifier: party_identifier.into(),
                party_sub_id_or_type: None,
                fsp_id: None,
                extension_list: None,
            },
            merchant_classification_code: None,
            name: None,
            personal_info: None,
            extensions: BTreeMap::new(),
        }
    }

    /// Sets the owning FSP.
    #[must_use]
    pub fn with_fsp_id(mut self, fsp_id: impl Into<String>) -> Self {
        self.party_id_info.fsp_id = Some(fsp_id.into());
        self
    }
}

/// Scenario classification of a transaction.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionType {
    /// Scenario, e.g. `TRANSFER`.
    pub scenario: String,
    /// Scheme-specific sub-scenario.
    pub sub_scenario: Option<String>,
    /// Which side initiates, `PAYER` or `PAYEE`.
    pub initiator: String,
    /// Initiator kind, e.g. `CONSUMER`.
    pub initiator_type: String,
    /// Refund details, carried opaquely.
    pub refund_info: Option<Value>,
    /// Balance of payments code.
    pub balance_of_payments: Option<String>,
}

/// An inbound quote request, as already parsed by the transport layer.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// End-to-end transaction identifier.
    pub transaction_id: Option<String>,
    /// Quote identifier.
    pub quote_id: Option<String>,
    /// Receiving party.
    pub payee: Option<Party>,
    /// Sending party.
    pub payer: Option<Party>,
    /// Requested amount, before fees.
    pub amount: Option<Money>,
    /// Whether `amount` is what is sent or what is received.
    pub amount_type: Option<String>,
    /// Transaction classification.
    pub transaction_type: Option<TransactionType>,
    /// Free-text note.
    pub note: Option<String>,
    /// Quote request expiry, ISO-8601.
    pub expiration: Option<String>,
}

/// The payee-side figures of a quote response, before the commitment is added.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialResponse {
    /// Amount actually payable, after fees. This is what gets committed to.
    pub transfer_amount: Option<Money>,
    /// Amount the payee receives.
    pub payee_receive_amount: Option<Money>,
    /// Fee charged by the payee FSP.
    pub payee_fsp_fee: Option<Money>,
    /// Commission paid by the payee FSP.
    pub payee_fsp_commission: Option<Money>,
    /// Quote response expiry, ISO-8601.
    pub expiration: Option<String>,
}

/// The canonical transaction summary embedded in an ILP packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionObject {
    /// End-to-end transaction identifier.
    pub transaction_id: String,
    /// Quote identifier.
    pub quote_id: String,
    /// Receiving party.
    pub payee: Party,
    /// Sending party.
    pub payer: Party,
    /// Committed transfer amount.
    pub amount: Money,
    /// Transaction classification.
    pub transaction_type: TransactionType,
}

/// An inbound transfer instruction.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Transfer identifier.
    pub transfer_id: Option<String>,
    /// FSP of the payer.
    pub payer_fsp: Option<String>,
    /// FSP of the payee.
    pub payee_fsp: Option<String>,
    /// Amount being transferred.
    pub amount: Money,
    /// Packet issued with the quote, as base64 text.
    pub ilp_packet: String,
    /// Condition issued with the quote, as base64url text.
    pub condition: String,
    /// Transfer expiry, ISO-8601.
    pub expiration: Option<String>,
}
