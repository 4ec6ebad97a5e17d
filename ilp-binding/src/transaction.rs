//! Assembly and embedding of the committed transaction object.
//!
//! The transaction object is what the packet, and therefore the condition,
//! commits to. It is serialized as canonical JSON (object keys sorted at every
//! depth, no whitespace) and carried in the packet `data` field as base64url
//! text, so identical inputs always produce identical packets.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::encoding::{decode_url, encode_url};
use crate::error::IlpError;
use crate::types::{PartialResponse, QuoteRequest, TransactionObject};

/// Builds the transaction object for a quote.
///
/// The committed `amount` is the response's `transferAmount`, i.e. the amount
/// after fees, not the amount originally requested.
///
/// # Errors
///
/// Returns [`IlpError::MissingField`] naming the first absent field, checked
/// in the order `transactionId`, `quoteId`, `payee`, `payer`,
/// `transactionType`, `transferAmount`. Empty identifiers count as absent.
pub fn build_transaction_object(
    quote: &QuoteRequest,
    response: &PartialResponse,
) -> Result<TransactionObject, IlpError> {
    let transaction_id = non_empty(quote.transaction_id.as_deref())
        .ok_or(IlpError::MissingField("transactionId"))?;
    let quote_id =
        non_empty(quote.quote_id.as_deref()).ok_or(IlpError::MissingField("quoteId"))?;
    let payee = quote.payee.as_ref().ok_or(IlpError::MissingField("payee"))?;
    let payer = quote.payer.as_ref().ok_or(IlpError::MissingField("payer"))?;
    let transaction_type = quote
        .transaction_type
        .as_ref()
        .ok_or(IlpError::MissingField("transactionType"))?;
    let amount = response
        .transfer_amount
        .as_ref()
        .ok_or(IlpError::MissingField("transferAmount"))?;

    Ok(TransactionObject {
        transaction_id: transaction_id.to_owned(),
        quote_id: quote_id.to_owned(),
        payee: payee.clone(),
        payer: payer.clone(),
        amount: amount.clone(),
        transaction_type: transaction_type.clone(),
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Serializes a value as canonical JSON.
///
/// # Errors
///
/// Returns [`IlpError::MalformedPayload`] if the value cannot be represented
/// as JSON.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<Vec<u8>, IlpError> {
    let value =
        serde_json::to_value(value).map_err(|e| IlpError::MalformedPayload(e.to_string()))?;
    serde_json::to_vec(&sort_keys(value)).map_err(|e| IlpError::MalformedPayload(e.to_string()))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, sort_keys(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Encodes a transaction object into packet `data` bytes.
///
/// # Errors
///
/// See [`canonical_json`].
pub fn encode_transaction_data(transaction: &TransactionObject) -> Result<Vec<u8>, IlpError> {
    Ok(encode_url(canonical_json(transaction)?).into_bytes())
}

/// Recovers a transaction object from packet `data` bytes.
///
/// Accepts base64url-wrapped JSON, as produced by
/// [`encode_transaction_data`], and bare JSON objects.
///
/// # Errors
///
/// Returns [`IlpError::MalformedPayload`] if the data is neither, or if the
/// JSON lacks a required transaction field.
pub fn decode_transaction_data(data: &[u8]) -> Result<TransactionObject, IlpError> {
    let malformed = |e: &dyn std::fmt::Display| IlpError::MalformedPayload(e.to_string());

    let trimmed = data.trim_ascii();
    let json = if trimmed.starts_with(b"{") {
        trimmed.to_vec()
    } else {
        decode_url(trimmed).map_err(|e| malformed(&e))?
    };
    serde_json::from_slice(&json).map_err(|e| malformed(&e))
}
