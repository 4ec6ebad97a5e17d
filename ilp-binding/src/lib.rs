#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Interledger commitments binding quotes to the transfers that settle them.
//!
//! A payee FSP answering a quote builds a canonical transaction object from
//! the quote request and its own response figures, wraps it in an ILP payment
//! packet, and derives a fulfillment (`HMAC-SHA256(secret, packet)`) and a
//! condition (`SHA-256(fulfillment)`). The packet and condition go out with the
//! quote response. When the transfer arrives, carrying the same packet and
//! condition, the payee checks that the transfer still moves the amount that
//! was quoted and regenerates the fulfillment from the packet alone.
//!
//! # Example
//!
//! ```rust
//! use ilp_binding::{IlpBinding, PartialResponse, QuoteRequest, TransferRequest};
//! use serde_json::json;
//!
//! let binding = IlpBinding::new("s3cr3t").unwrap();
//! let quote: QuoteRequest = serde_json::from_value(json!({
//!     "transactionId": "T1",
//!     "quoteId": "Q1",
//!     "payee": { "partyIdInfo": { "partyIdType": "MSISDN", "partyIdentifier": "1" } },
//!     "payer": { "partyIdInfo": { "partyIdType": "MSISDN", "partyIdentifier": "2" } },
//!     "amount": { "currency": "USD", "amount": "100" },
//!     "transactionType": { "scenario": "TRANSFER", "initiator": "PAYER", "initiatorType": "CONSUMER" }
//! }))
//! .unwrap();
//! let response: PartialResponse = serde_json::from_value(json!({
//!     "transferAmount": { "currency": "USD", "amount": "100" }
//! }))
//! .unwrap();
//!
//! let commitment = binding.generate_quote_response_commitment(&quote, &response).unwrap();
//! assert!(binding.validate_fulfillment(&commitment.fulfillment, &commitment.condition));
//!
//! let transfer: TransferRequest = serde_json::from_value(json!({
//!     "amount": { "currency": "USD", "amount": "100" },
//!     "ilpPacket": commitment.ilp_packet,
//!     "condition": commitment.condition
//! }))
//! .unwrap();
//! assert!(binding.validate_against_transfer(&transfer).unwrap());
//! ```
//!
//! # Modules
//!
//! - [`types`] - Quote, transfer and transaction message types
//! - [`transaction`] - Transaction object assembly and canonical embedding
//! - [`packet`] - ILP payment packet codec
//! - [`condition`] - Fulfillment and condition derivation
//! - [`validator`] - Transfer-time binding checks
//! - [`binding`] - The [`IlpBinding`] facade tying them together
//! - [`amount`] - Currency scaling for packet amounts
//! - [`encoding`] - Base64 wire encodings
//! - [`config`] - Secret and account configuration
//! - [`error`] - Error types
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod amount;
pub mod binding;
pub mod condition;
pub mod config;
pub mod encoding;
pub mod error;
pub mod packet;
pub mod transaction;
pub mod types;
pub mod validator;

pub use binding::{IlpBinding, QuoteCommitment, TransferCheck};
pub use condition::{Condition, ConditionGenerator, Fulfillment};
pub use config::IlpConfig;
pub use error::{DecodeError, ErrorReason, IlpError};
pub use packet::IlpPacket;
pub use types::{
    Money, PartialResponse, Party, PartyIdInfo, QuoteRequest, TransactionObject,
    TransactionType, TransferRequest,
};
