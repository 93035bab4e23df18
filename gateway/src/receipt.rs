//! Pending transactions, confirmed receipts and the events they carry.

use ballot_types::{ProposalId, Timestamp, TokenAmount, TxHash, WalletAddress};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three state-changing calls the governance contract accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteAction {
    CreateProposal,
    CastVote,
    ExecuteProposal,
}

impl WriteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateProposal => "create_proposal",
            Self::CastVote => "cast_vote",
            Self::ExecuteProposal => "execute_proposal",
        }
    }
}

impl fmt::Display for WriteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A write the ledger has accepted into its pending pool but not yet confirmed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingTx {
    pub hash: TxHash,
    pub action: WriteAction,
}

/// Final status of a transaction that left the pending pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TxStatus {
    Confirmed,
    Reverted { reason: String },
}

/// Events emitted by the governance contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    ProposalCreated {
        proposal_id: ProposalId,
        creator: WalletAddress,
        start_time: Timestamp,
        end_time: Timestamp,
    },
    VoteCast {
        voter: WalletAddress,
        proposal_id: ProposalId,
        support: bool,
        weight: TokenAmount,
    },
    ProposalExecuted {
        proposal_id: ProposalId,
        passed: bool,
    },
}

/// A transaction that is durably on the ledger (confirmed or reverted).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub tx: TxHash,
    pub status: TxStatus,
    pub events: Vec<LedgerEvent>,
}

impl Receipt {
    pub fn is_confirmed(&self) -> bool {
        self.status == TxStatus::Confirmed
    }

    /// Id assigned by the first `ProposalCreated` event, if any.
    pub fn created_proposal(&self) -> Option<ProposalId> {
        self.events.iter().find_map(|event| match event {
            LedgerEvent::ProposalCreated { proposal_id, .. } => Some(*proposal_id),
            _ => None,
        })
    }
}
