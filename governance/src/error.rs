use thiserror::Error;

use ballot_gateway::WriteAction;
use ballot_types::TxHash;

/// Client-side precondition failures. No ledger write is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("wallet is not connected")]
    NotConnected,

    #[error("proposal description is empty")]
    EmptyDescription,

    #[error("governance token balance is zero")]
    NoGovernanceTokens,

    #[error("another {scope} operation by this wallet is still in flight")]
    OperationInFlight { scope: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GovernanceError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to fetch {target}: {reason}")]
    RecordFetch { target: String, reason: String },

    #[error("{action} failed: {reason}")]
    Submission { action: WriteAction, reason: String },

    #[error("transaction {tx} confirmed but carried no {expected} event")]
    EventParse { tx: TxHash, expected: &'static str },
}

impl GovernanceError {
    pub(crate) fn record_fetch(target: impl ToString, reason: impl ToString) -> Self {
        Self::RecordFetch {
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn submission(action: WriteAction, reason: impl ToString) -> Self {
        Self::Submission {
            action,
            reason: reason.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
