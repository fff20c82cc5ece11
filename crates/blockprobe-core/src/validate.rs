//! Structural checks for block and transaction payloads.
//!
//! This is advisory shape checking, not protocol conformance: a payload is
//! recognised as a block or a transaction by the presence of marker fields,
//! and only the format of those fields is checked.

use serde_json::Value;

use crate::error::ValidationError;

/// Validate a decoded `result` payload. Rules are applied in order and the
/// first violation is returned.
pub fn validate(payload: &Value) -> Result<(), ValidationError> {
    let object = match payload {
        Value::Null => return Err(ValidationError::EmptyPayload),
        Value::Object(object) => object,
        _ => return Err(ValidationError::UnrecognizedShape),
    };

    if let Some(error) = present(payload, "error") {
        return Err(ValidationError::Embedded(embedded_message(error)));
    }

    let number = present(payload, "number");
    let hash = present(payload, "hash");

    // Block-shaped payload, or one of the single-field wrappers the client
    // builds around a bare block number / transaction hash.
    if let Some(number) = number {
        if !number.as_str().is_some_and(is_hex_quantity) {
            return Err(ValidationError::BlockNumber(render(number)));
        }
    }
    if let Some(hash) = hash {
        if !hash.as_str().is_some_and(is_hash32) {
            return Err(ValidationError::Hash(render(hash)));
        }
    }

    let transaction_index = present(payload, "transactionIndex");
    let from = present(payload, "from");
    // `to` is null for contract creation, so only the key has to exist.
    let to = object.get("to");

    if let (Some(index), Some(from), Some(to)) = (transaction_index, from, to) {
        if !from.as_str().is_some_and(is_address) {
            return Err(ValidationError::Address {
                field: "from",
                value: render(from),
            });
        }
        if !(to.is_null() || to.as_str().is_some_and(is_address)) {
            return Err(ValidationError::Address {
                field: "to",
                value: render(to),
            });
        }
        if !index.as_str().is_some_and(is_hex_quantity) {
            return Err(ValidationError::TransactionIndex(render(index)));
        }
    }

    if number.is_none() && hash.is_none() && transaction_index.is_none() {
        return Err(ValidationError::UnrecognizedShape);
    }

    Ok(())
}

// ==============================================================================
// Hex Format Predicates
// ==============================================================================

/// `^0x[0-9a-fA-F]+$`
pub fn is_hex_quantity(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// `^0x[0-9a-fA-F]{64}$`
pub fn is_hash32(value: &str) -> bool {
    is_hex_of_bytes(value, 32)
}

/// `^0x[0-9a-fA-F]{40}$`
pub fn is_address(value: &str) -> bool {
    is_hex_of_bytes(value, 20)
}

fn is_hex_of_bytes(value: &str, bytes: usize) -> bool {
    value.len() == 2 + bytes * 2 && is_hex_quantity(value)
}

// ==============================================================================
// Helpers
// ==============================================================================

fn present<'a>(payload: &'a Value, field: &str) -> Option<&'a Value> {
    payload.get(field).filter(|value| !value.is_null())
}

fn embedded_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(object) => match object.get("message") {
            Some(Value::String(message)) => message.clone(),
            _ => error.to_string(),
        },
        other => other.to_string(),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
