//! Raw proposal records as the ledger returns them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A proposal record exactly as read from the ledger.
///
/// Every field is optional and the numeric fields are untyped JSON: ledger
/// nodes disagree on whether 256-bit integers travel as numbers, decimal
/// strings or hex strings. JSON numbers are taken only up to `u64::MAX`;
/// vote weights above that (about 18.4 tokens at 18 decimals) must be sent
/// as strings or the record is rejected as malformed. Nothing downstream of the proposal builder sees
/// this type; the builder validates it into a typed `Proposal`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProposal {
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub for_votes: Option<Value>,
    #[serde(default)]
    pub against_votes: Option<Value>,
    #[serde(default)]
    pub start_time: Option<Value>,
    #[serde(default)]
    pub end_time: Option<Value>,
    #[serde(default)]
    pub executed: Option<bool>,
    #[serde(default)]
    pub passed: Option<bool>,
}
