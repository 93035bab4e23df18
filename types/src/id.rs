//! Ledger-assigned proposal identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// A proposal id. Ids are assigned by the ledger, start at 1 and are contiguous.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProposalId(u64);

impl ProposalId {
    /// The first id the ledger ever assigns.
    pub const FIRST: Self = Self(1);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// All ids a ledger reporting `count` proposals has assigned, in creation order.
    pub fn range(count: u64) -> impl Iterator<Item = ProposalId> {
        (1..=count).map(ProposalId)
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for ProposalId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('#');
        match trimmed.parse::<u64>() {
            Ok(0) | Err(_) => Err(TypesError::InvalidProposalId(s.to_string())),
            Ok(n) => Ok(Self(n)),
        }
    }
}
