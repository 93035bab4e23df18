//! Voting workflow: the create / vote / execute write paths.
//!
//! Each operation validates its preconditions, submits the write, waits for
//! ledger confirmation and, for vote and execute, re-reads the affected
//! proposal. Those steps always run in that order for a single call. No
//! operation retries on its own; resubmitting a write is the caller's call.

use ballot_gateway::{GatewayError, LedgerGateway, PendingTx, Receipt, TxStatus, WriteAction};
use ballot_types::{Clock, ProposalId, TxHash, WalletAddress};
use std::sync::Arc;
use tracing::Instrument;

use crate::content::ProposalContent;
use crate::error::{GovernanceError, ValidationError};
use crate::inflight::{InFlight, InFlightGuard, OperationKey, OperationPhase, OperationScope};
use crate::proposal::Proposal;
use crate::repository::ProposalRepository;
use crate::session::WalletSession;
use crate::spans;

/// Result of a confirmed vote or execution.
///
/// The write itself succeeded once this value exists. `refreshed` is the
/// follow-up read of the proposal, which can fail on its own without
/// undoing the write.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub receipt: Receipt,
    pub refreshed: Result<Proposal, GovernanceError>,
}

impl WriteOutcome {
    pub fn tx(&self) -> TxHash {
        self.receipt.tx
    }

    /// The refreshed proposal, or the error from the refresh read.
    pub fn into_proposal(self) -> Result<Proposal, GovernanceError> {
        self.refreshed
    }
}

pub struct VotingWorkflow<G, C> {
    gateway: Arc<G>,
    repository: ProposalRepository<G, C>,
    in_flight: Arc<InFlight>,
}

impl<G, C> Clone for VotingWorkflow<G, C> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            repository: self.repository.clone(),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<G: LedgerGateway, C: Clock> VotingWorkflow<G, C> {
    pub fn new(gateway: Arc<G>, repository: ProposalRepository<G, C>) -> Self {
        Self {
            gateway,
            repository,
            in_flight: InFlight::new(),
        }
    }

    /// Current phase of the operation identified by `key`.
    pub fn phase(&self, key: &OperationKey) -> OperationPhase {
        self.in_flight.phase(key)
    }

    /// Create a proposal and return the id the ledger assigned to it.
    ///
    /// Preconditions, checked before any write: a connected wallet, a
    /// non-blank description, and a governance token balance above zero.
    pub async fn create_proposal(
        &self,
        session: &WalletSession,
        content: &ProposalContent,
    ) -> Result<ProposalId, GovernanceError> {
        let action = WriteAction::CreateProposal;
        let voter = session.address().ok_or(ValidationError::NotConnected)?;
        if content.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription.into());
        }
        let guard = self
            .in_flight
            .begin(OperationKey::new(OperationScope::Creation, voter.clone()))?;

        let result = async {
            let balance = self
                .gateway
                .read_token_balance(&voter)
                .await
                .map_err(|e| GovernanceError::record_fetch("token balance", e))?;
            if balance.is_zero() {
                return Err(ValidationError::NoGovernanceTokens.into());
            }

            let description = content.compose();
            let pending = self.gateway.submit_create(&voter, &description).await;
            let receipt = self.confirm(&guard, action, pending).await?;
            let id = receipt
                .created_proposal()
                .ok_or(GovernanceError::EventParse {
                    tx: receipt.tx,
                    expected: "ProposalCreated",
                })?;
            tracing::info!(proposal_id = %id, tx = %receipt.tx, "proposal created");
            Ok::<_, GovernanceError>(id)
        }
        .instrument(spans::write_span(action, &voter))
        .await;

        guard.settle(&result);
        result
    }

    /// Cast a vote and re-read the proposal.
    ///
    /// Eligibility and the one-vote-per-wallet rule are enforced by the
    /// ledger; a second vote surfaces as a submission error.
    pub async fn cast_vote(
        &self,
        session: &WalletSession,
        id: ProposalId,
        support: bool,
    ) -> Result<WriteOutcome, GovernanceError> {
        let action = WriteAction::CastVote;
        let voter = session.address().ok_or(ValidationError::NotConnected)?;
        let guard = self
            .in_flight
            .begin(OperationKey::new(OperationScope::Proposal(id), voter.clone()))?;

        async {
            let pending = self.gateway.submit_vote(&voter, id, support).await;
            let receipt = self.confirm(&guard, action, pending).await;
            guard.settle(&receipt);
            let receipt = receipt?;
            tracing::info!(proposal_id = %id, support, tx = %receipt.tx, "vote confirmed");
            Ok::<_, GovernanceError>(self.refresh(receipt, id, &voter).await)
        }
        .instrument(spans::write_span(action, &voter))
        .await
    }

    /// Execute (finalise) a proposal and re-read it.
    ///
    /// Not gated on the voting window here: a premature execution is
    /// rejected by the ledger and surfaces as a submission error.
    pub async fn execute_proposal(
        &self,
        session: &WalletSession,
        id: ProposalId,
    ) -> Result<WriteOutcome, GovernanceError> {
        let action = WriteAction::ExecuteProposal;
        let voter = session.address().ok_or(ValidationError::NotConnected)?;
        let guard = self
            .in_flight
            .begin(OperationKey::new(OperationScope::Proposal(id), voter.clone()))?;

        async {
            let pending = self.gateway.submit_execute(&voter, id).await;
            let receipt = self.confirm(&guard, action, pending).await;
            guard.settle(&receipt);
            let receipt = receipt?;
            tracing::info!(proposal_id = %id, tx = %receipt.tx, "execution confirmed");
            Ok::<_, GovernanceError>(self.refresh(receipt, id, &voter).await)
        }
        .instrument(spans::write_span(action, &voter))
        .await
    }

    /// Wait for a submitted write to be confirmed.
    async fn confirm(
        &self,
        guard: &InFlightGuard,
        action: WriteAction,
        pending: Result<PendingTx, GatewayError>,
    ) -> Result<Receipt, GovernanceError> {
        let pending = pending.map_err(|e| GovernanceError::submission(action, e))?;
        tracing::info!(tx = %pending.hash, "write accepted, awaiting confirmation");
        guard.set(OperationPhase::Confirming);

        let receipt = self
            .gateway
            .await_confirmation(&pending)
            .await
            .map_err(|e| GovernanceError::submission(action, e))?;
        match &receipt.status {
            TxStatus::Confirmed => Ok(receipt),
            TxStatus::Reverted { reason } => {
                tracing::warn!(tx = %receipt.tx, %reason, "write reverted");
                Err(GovernanceError::submission(action, format!("reverted: {reason}")))
            }
        }
    }

    async fn refresh(
        &self,
        receipt: Receipt,
        id: ProposalId,
        voter: &WalletAddress,
    ) -> WriteOutcome {
        let refreshed = self.repository.fetch_one(id, Some(voter)).await;
        if let Err(error) = &refreshed {
            tracing::warn!(proposal_id = %id, %error, "write confirmed but refresh failed");
        }
        WriteOutcome { receipt, refreshed }
    }
}
