//! Parse errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("invalid proposal id: {0}")]
    InvalidProposalId(String),

    #[error("invalid token amount: {0}")]
    InvalidAmount(String),

    #[error("invalid transaction hash: {0}")]
    InvalidTxHash(String),
}
