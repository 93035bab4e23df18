//! Contract-level governance parameters.

use ballot_types::TokenAmount;
use serde::{Deserialize, Serialize};

/// Parameters the governance contract reports about itself.
///
/// The client only displays these; quorum and window enforcement happen on
/// the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceParams {
    /// Minimum participation for an outcome to be valid, in raw token units.
    pub quorum: TokenAmount,
    /// Length of every proposal's voting window.
    pub voting_period_secs: u64,
    /// Decimals of the governance token.
    pub token_decimals: u8,
}

impl GovernanceParams {
    /// Quorum as a decimal token string.
    pub fn quorum_display(&self) -> String {
        self.quorum.format_units(self.token_decimals)
    }
}
