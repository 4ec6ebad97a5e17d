//! Quote-to-transfer scenarios across the whole pipeline.

use std::sync::Arc;
use std::thread;

use ilp_binding::{
    DecodeError, IlpBinding, IlpError, PartialResponse, QuoteRequest, TransferRequest,
};
use serde_json::json;

const SECRET: &str = "switch-participant-secret";

fn quote_request() -> QuoteRequest {
    serde_json::from_value(json!({
        "transactionId": "T1",
        "quoteId": "Q1",
        "payee": {
            "partyIdInfo": { "partyIdType": "MSISDN", "partyIdentifier": "27713803912", "fspId": "payeefsp" },
            "name": "Payee"
        },
        "payer": {
            "partyIdInfo": { "partyIdType": "MSISDN", "partyIdentifier": "44123456789", "fspId": "payerfsp" },
            "personalInfo": { "complexName": { "firstName": "Mats", "lastName": "Hagman" } }
        },
        "amountType": "SEND",
        "amount": { "currency": "USD", "amount": "100" },
        "transactionType": { "scenario": "TRANSFER", "initiator": "PAYER", "initiatorType": "CONSUMER" }
    }))
    .unwrap()
}

fn partial_response() -> PartialResponse {
    serde_json::from_value(json!({ "transferAmount": { "currency": "USD", "amount": "100" } }))
        .unwrap()
}

fn transfer(ilp_packet: &str, condition: &str, amount: &str) -> TransferRequest {
    serde_json::from_value(json!({
        "transferId": "b51ec534-ee48-4575-b6a9-ead2955b8069",
        "payerFsp": "payerfsp",
        "payeeFsp": "payeefsp",
        "amount": { "currency": "USD", "amount": amount },
        "ilpPacket": ilp_packet,
        "condition": condition,
        "expiration": "2030-01-01T00:00:00.000Z"
    }))
    .unwrap()
}

#[test]
fn test_end_to_end_scenario() {
    let binding = IlpBinding::new(SECRET).unwrap();
    let commitment = binding
        .generate_quote_response_commitment(&quote_request(), &partial_response())
        .unwrap();
    assert!(!commitment.fulfillment.is_empty());
    assert!(!commitment.ilp_packet.is_empty());
    assert!(!commitment.condition.is_empty());
    assert!(binding.validate_fulfillment(&commitment.fulfillment, &commitment.condition));

    let valid = transfer(&commitment.ilp_packet, &commitment.condition, "100");
    assert!(binding.validate_against_transfer(&valid).unwrap());

    let tampered = transfer(&commitment.ilp_packet, &commitment.condition, "200");
    assert!(!binding.validate_against_transfer(&tampered).unwrap());
}

#[test]
fn test_independent_instances_agree() {
    let first = IlpBinding::new(SECRET)
        .unwrap()
        .generate_quote_response_commitment(&quote_request(), &partial_response())
        .unwrap();
    let second = IlpBinding::new(SECRET.as_bytes().to_vec())
        .unwrap()
        .generate_quote_response_commitment(&quote_request(), &partial_response())
        .unwrap();
    assert_eq!(first.fulfillment, second.fulfillment);
    assert_eq!(first.ilp_packet, second.ilp_packet);
    assert_eq!(first.condition, second.condition);
}

#[test]
fn test_embedded_transaction_matches_inputs() {
    let binding = IlpBinding::new(SECRET).unwrap();
    let commitment = binding
        .generate_quote_response_commitment(&quote_request(), &partial_response())
        .unwrap();
    let transaction = binding.get_transaction_object(&commitment.ilp_packet).unwrap();
    assert_eq!(
        serde_json::to_value(&transaction).unwrap(),
        json!({
            "transactionId": "T1",
            "quoteId": "Q1",
            "payee": {
                "partyIdInfo": { "partyIdType": "MSISDN", "partyIdentifier": "27713803912", "fspId": "payeefsp" },
                "name": "Payee"
            },
            "payer": {
                "partyIdInfo": { "partyIdType": "MSISDN", "partyIdentifier": "44123456789", "fspId": "payerfsp" },
                "personalInfo": { "complexName": { "firstName": "Mats", "lastName": "Hagman" } }
            },
            "amount": { "currency": "USD", "amount": "100" },
            "transactionType": { "scenario": "TRANSFER", "initiator": "PAYER", "initiatorType": "CONSUMER" }
        })
    );
}

#[test]
fn test_packet_survives_url_safe_reencoding() {
    let binding = IlpBinding::new(SECRET).unwrap();
    let commitment = binding
        .generate_quote_response_commitment(&quote_request(), &partial_response())
        .unwrap();
    let url_safe = commitment
        .ilp_packet
        .trim_end_matches('=')
        .replace('+', "-")
        .replace('/', "_");

    let check = binding
        .check_transfer(&transfer(&url_safe, &commitment.condition, "100"))
        .unwrap();
    assert!(check.is_valid());
    assert_eq!(check.fulfillment.to_base64url(), commitment.fulfillment);
}

#[test]
fn test_malformed_packets_raise_decode_errors() {
    let binding = IlpBinding::new(SECRET).unwrap();
    let commitment = binding
        .generate_quote_response_commitment(&quote_request(), &partial_response())
        .unwrap();

    assert!(matches!(
        binding.decode_packet("this is *not* base64").unwrap_err(),
        IlpError::Decode(DecodeError::Base64(_))
    ));

    let bytes = ilp_binding::encoding::decode_packet(&commitment.ilp_packet).unwrap();
    let truncated = ilp_binding::encoding::encode_packet(&bytes[..bytes.len() - 5]);
    assert!(matches!(
        binding.decode_packet(&truncated).unwrap_err(),
        IlpError::Decode(_)
    ));

    let mut retyped = bytes;
    retyped[0] = 13;
    let retyped = ilp_binding::encoding::encode_packet(&retyped);
    assert!(matches!(
        binding.decode_packet(&retyped).unwrap_err(),
        IlpError::Decode(DecodeError::UnknownType(13))
    ));
    assert!(matches!(
        binding
            .validate_against_transfer(&transfer(&retyped, &commitment.condition, "100"))
            .unwrap_err(),
        IlpError::Decode(_)
    ));
}

#[test]
fn test_batch_validation_is_not_aborted_by_rejections() {
    let binding = IlpBinding::new(SECRET).unwrap();
    let commitment = binding
        .generate_quote_response_commitment(&quote_request(), &partial_response())
        .unwrap();
    let results: Vec<bool> = ["100", "100.00", "99", "100"]
        .iter()
        .map(|amount| {
            binding
                .validate_against_transfer(&transfer(
                    &commitment.ilp_packet,
                    &commitment.condition,
                    amount,
                ))
                .unwrap()
        })
        .collect();
    assert_eq!(results, vec![true, false, false, true]);
}

#[test]
fn test_shared_instance_across_threads() {
    let binding = Arc::new(IlpBinding::new(SECRET).unwrap());
    let expected = binding
        .generate_quote_response_commitment(&quote_request(), &partial_response())
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let binding = Arc::clone(&binding);
            thread::spawn(move || {
                binding
                    .generate_quote_response_commitment(&quote_request(), &partial_response())
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
