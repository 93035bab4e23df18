//! Proposal repository: assembles proposal snapshots from ledger reads.
//!
//! The repository keeps no state between calls. Every fetch re-reads the
//! ledger and hands back freshly built, independently owned snapshots.

use ballot_gateway::LedgerGateway;
use ballot_types::{Clock, ProposalId, Timestamp, WalletAddress};
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::Instrument;

use crate::builder::ProposalBuilder;
use crate::error::GovernanceError;
use crate::proposal::Proposal;
use crate::spans;

/// Default number of proposal reads kept in flight by [`ProposalRepository::fetch_all`].
pub const DEFAULT_FETCH_CONCURRENCY: usize = 8;

/// A proposal id that could not be loaded during a collection fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub id: ProposalId,
    pub error: GovernanceError,
}

/// Result of a collection fetch.
///
/// `proposals` holds every id in `1..=count` that loaded, in ascending id
/// order. Ids that failed are left out of `proposals` and listed in `failures`.
#[derive(Debug, Clone, Default)]
pub struct ProposalBatch {
    pub count: u64,
    pub proposals: Vec<Proposal>,
    pub failures: Vec<FetchFailure>,
}

impl ProposalBatch {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct ProposalRepository<G, C> {
    gateway: Arc<G>,
    clock: Arc<C>,
    concurrency: usize,
}

impl<G, C> Clone for ProposalRepository<G, C> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            clock: Arc::clone(&self.clock),
            concurrency: self.concurrency,
        }
    }
}

impl<G: LedgerGateway, C: Clock> ProposalRepository<G, C> {
    pub fn new(gateway: Arc<G>, clock: Arc<C>) -> Self {
        Self {
            gateway,
            clock,
            concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    /// Bound the number of concurrent proposal reads in [`fetch_all`](Self::fetch_all).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetch and build a single proposal.
    ///
    /// `caller` decides whose vote flag is read; `None` is an unauthenticated read.
    pub async fn fetch_one(
        &self,
        id: ProposalId,
        caller: Option<&WalletAddress>,
    ) -> Result<Proposal, GovernanceError> {
        let builder = self.builder().await?;
        self.fetch_with(builder, id, caller, self.clock.now()).await
    }

    /// Fetch every proposal the ledger has, in creation order.
    ///
    /// Reads are fanned out with bounded concurrency and the results sorted
    /// back into ascending id order. A proposal that fails to load is skipped
    /// and reported in [`ProposalBatch::failures`]; failing to read the count
    /// or the token decimals fails the whole call.
    pub async fn fetch_all(
        &self,
        caller: Option<&WalletAddress>,
    ) -> Result<ProposalBatch, GovernanceError> {
        let count = self
            .gateway
            .read_proposal_count()
            .await
            .map_err(|e| GovernanceError::record_fetch("proposal count", e))?;
        let builder = self.builder().await?;
        let now = self.clock.now();

        let mut results: Vec<(ProposalId, Result<Proposal, GovernanceError>)> =
            stream::iter(ProposalId::range(count))
                .map(|id| async move { (id, self.fetch_with(builder, id, caller, now).await) })
                .buffer_unordered(self.concurrency)
                .collect()
                .instrument(spans::fetch_all_span(count))
                .await;
        results.sort_by_key(|(id, _)| *id);

        let mut batch = ProposalBatch {
            count,
            proposals: Vec::with_capacity(results.len()),
            failures: Vec::new(),
        };
        for (id, result) in results {
            match result {
                Ok(proposal) => batch.proposals.push(proposal),
                Err(error) => {
                    tracing::warn!(proposal_id = %id, %error, "skipping proposal that failed to load");
                    batch.failures.push(FetchFailure { id, error });
                }
            }
        }
        tracing::debug!(
            count,
            loaded = batch.proposals.len(),
            failed = batch.failures.len(),
            "proposal collection fetched"
        );
        Ok(batch)
    }

    async fn builder(&self) -> Result<ProposalBuilder, GovernanceError> {
        let decimals = self
            .gateway
            .read_token_decimals()
            .await
            .map_err(|e| GovernanceError::record_fetch("token decimals", e))?;
        Ok(ProposalBuilder::new(decimals))
    }

    async fn fetch_with(
        &self,
        builder: ProposalBuilder,
        id: ProposalId,
        caller: Option<&WalletAddress>,
        now: Timestamp,
    ) -> Result<Proposal, GovernanceError> {
        let target = || format!("proposal {id}");
        let raw = self
            .gateway
            .read_proposal(id)
            .await
            .map_err(|e| GovernanceError::record_fetch(target(), e))?;
        let caller_voted = match caller {
            Some(voter) => Some(
                self.gateway
                    .read_has_voted(id, voter)
                    .await
                    .map_err(|e| GovernanceError::record_fetch(target(), e))?,
            ),
            None => None,
        };
        builder.build(id, &raw, now, caller_voted)
    }
}
