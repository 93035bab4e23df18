//! Decoding of node responses into gateway types.

use ballot_gateway::{GatewayError, LedgerEvent};
use ballot_types::{TokenAmount, TxHash};
use serde::Deserialize;
use serde_json::Value;

/// Status of a transaction as reported by `tx_receipt`.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(crate) enum ReceiptResponse {
    Pending,
    Dropped,
    Confirmed {
        #[serde(default)]
        events: Vec<LedgerEvent>,
    },
    Reverted {
        #[serde(default)]
        reason: String,
    },
}

pub(crate) fn malformed(action: &str, detail: impl std::fmt::Display) -> GatewayError {
    GatewayError::Malformed(format!("invalid {action} response: {detail}"))
}

/// Pull `field` out of an object result, or take a bare scalar result as-is.
pub(crate) fn field<'a>(result: &'a Value, field: &str) -> &'a Value {
    match result {
        Value::Object(map) => map.get(field).unwrap_or(&Value::Null),
        other => other,
    }
}

/// An unsigned integer sent as a JSON number, a decimal string or a hex string.
pub(crate) fn uint(action: &str, value: &Value) -> Result<u128, GatewayError> {
    TokenAmount::from_json(value)
        .map(|a| a.raw())
        .map_err(|e| malformed(action, e))
}

pub(crate) fn u64_field(action: &str, result: &Value, name: &str) -> Result<u64, GatewayError> {
    let raw = uint(action, field(result, name))?;
    u64::try_from(raw).map_err(|_| malformed(action, format!("{name} out of range: {raw}")))
}

pub(crate) fn amount_field(
    action: &str,
    result: &Value,
    name: &str,
) -> Result<TokenAmount, GatewayError> {
    uint(action, field(result, name)).map(TokenAmount::new)
}

pub(crate) fn bool_field(action: &str, result: &Value, name: &str) -> Result<bool, GatewayError> {
    field(result, name)
        .as_bool()
        .ok_or_else(|| malformed(action, format!("{name} is not a boolean")))
}

pub(crate) fn tx_hash(action: &str, result: &Value) -> Result<TxHash, GatewayError> {
    let hash = field(result, "hash")
        .as_str()
        .ok_or_else(|| malformed(action, "missing transaction hash"))?;
    TxHash::from_hex(hash).map_err(|e| malformed(action, e))
}

pub(crate) fn receipt(result: Value) -> Result<ReceiptResponse, GatewayError> {
    serde_json::from_value(result).map_err(|e| malformed("tx_receipt", e))
}
