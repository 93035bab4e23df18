use thiserror::Error;

use ballot_types::ProposalId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed ledger response: {0}")]
    Malformed(String),

    #[error("proposal {0} not found")]
    NotFound(ProposalId),

    #[error("write rejected by the ledger: {0}")]
    Rejected(String),

    #[error("transaction {0} was dropped before confirmation")]
    Dropped(String),

    #[error("timed out waiting for confirmation of {0}")]
    Timeout(String),
}
