//! The upward-facing governance client used by presentation layers.

use ballot_gateway::LedgerGateway;
use ballot_types::{Clock, ProposalId, WalletAddress};
use std::sync::Arc;

use crate::content::ProposalContent;
use crate::error::GovernanceError;
use crate::params::GovernanceParams;
use crate::proposal::{Proposal, ProposalFilter};
use crate::repository::{ProposalBatch, ProposalRepository};
use crate::session::WalletSession;
use crate::tally::{self, TallyResult};
use crate::workflow::{VotingWorkflow, WriteOutcome};

/// Reads, writes and statistics over one governance ledger.
///
/// Cloning is cheap and clones share the same reentrancy guard, so a write
/// started through one clone blocks the same write through another.
pub struct GovernanceClient<G, C> {
    gateway: Arc<G>,
    repository: ProposalRepository<G, C>,
    workflow: VotingWorkflow<G, C>,
}

impl<G, C> Clone for GovernanceClient<G, C> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            repository: self.repository.clone(),
            workflow: self.workflow.clone(),
        }
    }
}

impl<G: LedgerGateway, C: Clock> GovernanceClient<G, C> {
    pub fn new(gateway: Arc<G>, clock: Arc<C>) -> Self {
        Self::from_repository(ProposalRepository::new(Arc::clone(&gateway), clock), gateway)
    }

    /// Bound the number of concurrent reads used when listing proposals.
    pub fn with_concurrency(self, concurrency: usize) -> Self {
        let repository = self.repository.with_concurrency(concurrency);
        Self::from_repository(repository, self.gateway)
    }

    fn from_repository(repository: ProposalRepository<G, C>, gateway: Arc<G>) -> Self {
        Self {
            workflow: VotingWorkflow::new(Arc::clone(&gateway), repository.clone()),
            gateway,
            repository,
        }
    }

    pub fn repository(&self) -> &ProposalRepository<G, C> {
        &self.repository
    }

    pub fn workflow(&self) -> &VotingWorkflow<G, C> {
        &self.workflow
    }

    /// Proposals matching `filter`, in creation order.
    ///
    /// Proposals that fail to load are left out (and logged). Use
    /// [`list_batch`](Self::list_batch) to see which ids were skipped.
    pub async fn list_proposals(
        &self,
        filter: ProposalFilter,
        caller: Option<&WalletAddress>,
    ) -> Result<Vec<Proposal>, GovernanceError> {
        let batch = self.repository.fetch_all(caller).await?;
        Ok(filter.apply(batch.proposals))
    }

    /// Every proposal together with the ids that failed to load.
    pub async fn list_batch(
        &self,
        caller: Option<&WalletAddress>,
    ) -> Result<ProposalBatch, GovernanceError> {
        self.repository.fetch_all(caller).await
    }

    pub async fn get_proposal(
        &self,
        id: ProposalId,
        caller: Option<&WalletAddress>,
    ) -> Result<Proposal, GovernanceError> {
        self.repository.fetch_one(id, caller).await
    }

    pub async fn create_proposal(
        &self,
        session: &WalletSession,
        content: &ProposalContent,
    ) -> Result<ProposalId, GovernanceError> {
        self.workflow.create_proposal(session, content).await
    }

    pub async fn vote(
        &self,
        session: &WalletSession,
        id: ProposalId,
        support: bool,
    ) -> Result<WriteOutcome, GovernanceError> {
        self.workflow.cast_vote(session, id, support).await
    }

    pub async fn execute(
        &self,
        session: &WalletSession,
        id: ProposalId,
    ) -> Result<WriteOutcome, GovernanceError> {
        self.workflow.execute_proposal(session, id).await
    }

    pub fn stats(&self, proposals: &[Proposal]) -> TallyResult {
        tally::aggregate(proposals)
    }

    /// Quorum, voting period and token decimals as the ledger reports them.
    pub async fn params(&self) -> Result<GovernanceParams, GovernanceError> {
        let quorum = self
            .gateway
            .read_quorum()
            .await
            .map_err(|e| GovernanceError::record_fetch("quorum", e))?;
        let voting_period_secs = self
            .gateway
            .read_voting_period()
            .await
            .map_err(|e| GovernanceError::record_fetch("voting period", e))?;
        let token_decimals = self
            .gateway
            .read_token_decimals()
            .await
            .map_err(|e| GovernanceError::record_fetch("token decimals", e))?;
        Ok(GovernanceParams {
            quorum,
            voting_period_secs,
            token_decimals,
        })
    }
}
