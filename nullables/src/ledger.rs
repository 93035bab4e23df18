//! Nullable ledger: an in-memory governance contract for testing.
//!
//! Behaves like the real contract for the happy paths (ids, windows, one
//! vote per wallet, balance-weighted votes, quorum-gated execution) and can
//! be scripted to fail every step a client has to cope with: failing reads,
//! rejected submissions, reverts, dropped transactions, confirmations that
//! never arrive, and receipts missing their events.

use ballot_gateway::{
    GatewayError, LedgerEvent, LedgerGateway, PendingTx, RawProposal, Receipt, TxStatus,
    WriteAction,
};
use ballot_types::{Clock, ProposalId, Timestamp, TokenAmount, TxHash, WalletAddress};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

use crate::clock::NullClock;

/// Default voting window for proposals created through the ledger.
pub const DEFAULT_VOTING_PERIOD_SECS: u64 = 3 * 24 * 60 * 60;

/// One gateway call, as recorded by [`NullLedger`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerCall {
    ReadProposal(ProposalId),
    ReadProposalCount,
    ReadHasVoted(ProposalId, WalletAddress),
    ReadTokenDecimals,
    ReadTokenBalance(WalletAddress),
    ReadQuorum,
    ReadVotingPeriod,
    SubmitCreate(WalletAddress),
    SubmitVote(WalletAddress, ProposalId, bool),
    SubmitExecute(WalletAddress, ProposalId),
    AwaitConfirmation(TxHash),
}

impl LedgerCall {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::SubmitCreate(_) | Self::SubmitVote(..) | Self::SubmitExecute(..)
        )
    }
}

#[derive(Clone, Debug)]
struct StoredProposal {
    creator: WalletAddress,
    description: String,
    for_votes: TokenAmount,
    against_votes: TokenAmount,
    start_time: Timestamp,
    end_time: Timestamp,
    executed: bool,
    passed: bool,
}

impl StoredProposal {
    fn to_raw(&self) -> RawProposal {
        RawProposal {
            creator: Some(self.creator.to_string()),
            description: Some(self.description.clone()),
            for_votes: Some(json!(self.for_votes.raw().to_string())),
            against_votes: Some(json!(self.against_votes.raw().to_string())),
            start_time: Some(json!(self.start_time.as_secs())),
            end_time: Some(json!(self.end_time.as_secs())),
            executed: Some(self.executed),
            passed: Some(self.passed),
        }
    }
}

#[derive(Clone, Debug)]
enum PendingWrite {
    Create {
        signer: WalletAddress,
        description: String,
    },
    Vote {
        signer: WalletAddress,
        id: ProposalId,
        support: bool,
    },
    Execute {
        id: ProposalId,
    },
}

#[derive(Debug)]
struct LedgerState {
    proposals: Vec<StoredProposal>,
    votes: HashMap<(ProposalId, WalletAddress), bool>,
    balances: HashMap<WalletAddress, TokenAmount>,
    decimals: u8,
    quorum: TokenAmount,
    voting_period_secs: u64,
    raw_overrides: HashMap<ProposalId, RawProposal>,
    failing_reads: HashSet<ProposalId>,
    fail_count: bool,
    fail_decimals: bool,
    fail_balance: bool,
    reject_submits: Option<String>,
    revert_next: Option<String>,
    drop_next: bool,
    omit_events: bool,
    hold_confirmations: bool,
    pending: HashMap<TxHash, PendingWrite>,
    next_tx: u64,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            proposals: Vec::new(),
            votes: HashMap::new(),
            balances: HashMap::new(),
            decimals: 18,
            quorum: TokenAmount::ZERO,
            voting_period_secs: DEFAULT_VOTING_PERIOD_SECS,
            raw_overrides: HashMap::new(),
            failing_reads: HashSet::new(),
            fail_count: false,
            fail_decimals: false,
            fail_balance: false,
            reject_submits: None,
            revert_next: None,
            drop_next: false,
            omit_events: false,
            hold_confirmations: false,
            pending: HashMap::new(),
            next_tx: 1,
        }
    }
}

/// An in-memory [`LedgerGateway`].
///
/// Thread-safe for use with tokio's multi-threaded runtime. Time comes from
/// the shared [`NullClock`], so tests move the ledger and the client through
/// voting windows together.
pub struct NullLedger {
    state: Mutex<LedgerState>,
    calls: Mutex<Vec<LedgerCall>>,
    clock: Arc<NullClock>,
    released: Notify,
}

impl NullLedger {
    pub fn new(clock: Arc<NullClock>) -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            calls: Mutex::new(Vec::new()),
            clock,
            released: Notify::new(),
        }
    }

    pub fn clock(&self) -> &Arc<NullClock> {
        &self.clock
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap()
    }

    fn record(&self, call: LedgerCall) {
        self.calls.lock().unwrap().push(call);
    }

    // --- seeding ---

    pub fn set_balance(&self, owner: &WalletAddress, amount: TokenAmount) {
        self.state().balances.insert(owner.clone(), amount);
    }

    pub fn set_decimals(&self, decimals: u8) {
        self.state().decimals = decimals;
    }

    pub fn set_quorum(&self, quorum: TokenAmount) {
        self.state().quorum = quorum;
    }

    pub fn set_voting_period(&self, secs: u64) {
        self.state().voting_period_secs = secs;
    }

    /// Insert a proposal directly, bypassing the write path.
    pub fn seed_proposal(
        &self,
        creator: &WalletAddress,
        description: &str,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> ProposalId {
        let mut state = self.state();
        state.proposals.push(StoredProposal {
            creator: creator.clone(),
            description: description.to_string(),
            for_votes: TokenAmount::ZERO,
            against_votes: TokenAmount::ZERO,
            start_time,
            end_time,
            executed: false,
            passed: false,
        });
        ProposalId::new(state.proposals.len() as u64)
    }

    /// Set the tallies of an existing proposal.
    pub fn seed_tally(&self, id: ProposalId, for_votes: TokenAmount, against_votes: TokenAmount) {
        if let Some(p) = self.state().proposal_mut(id) {
            p.for_votes = for_votes;
            p.against_votes = against_votes;
        }
    }

    /// Mark an existing proposal executed with the given outcome.
    pub fn seed_outcome(&self, id: ProposalId, passed: bool) {
        if let Some(p) = self.state().proposal_mut(id) {
            p.executed = true;
            p.passed = passed;
        }
    }

    /// Serve `raw` for `id` instead of the stored record.
    pub fn set_raw(&self, id: ProposalId, raw: RawProposal) {
        self.state().raw_overrides.insert(id, raw);
    }

    // --- scripted failures ---

    /// Fail every read of proposal `id` (record and vote flag).
    pub fn fail_reads_of(&self, id: ProposalId) {
        self.state().failing_reads.insert(id);
    }

    pub fn heal_reads_of(&self, id: ProposalId) {
        self.state().failing_reads.remove(&id);
    }

    pub fn fail_count_reads(&self, fail: bool) {
        self.state().fail_count = fail;
    }

    pub fn fail_decimals_reads(&self, fail: bool) {
        self.state().fail_decimals = fail;
    }

    pub fn fail_balance_reads(&self, fail: bool) {
        self.state().fail_balance = fail;
    }

    /// Reject every submission with `reason` (`None` to stop).
    pub fn reject_submits(&self, reason: Option<&str>) {
        self.state().reject_submits = reason.map(str::to_string);
    }

    /// Revert the next confirmed write with `reason`, leaving state untouched.
    pub fn revert_next(&self, reason: &str) {
        self.state().revert_next = Some(reason.to_string());
    }

    /// Drop the next transaction from the pending pool.
    pub fn drop_next(&self) {
        self.state().drop_next = true;
    }

    /// Confirm writes without emitting their events.
    pub fn omit_events(&self, omit: bool) {
        self.state().omit_events = omit;
    }

    /// Hold every confirmation until [`release_confirmations`](Self::release_confirmations).
    pub fn hold_confirmations(&self) {
        self.state().hold_confirmations = true;
    }

    pub fn release_confirmations(&self) {
        self.state().hold_confirmations = false;
        self.released.notify_waiters();
    }

    // --- inspection ---

    pub fn calls(&self) -> Vec<LedgerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn write_count(&self) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.is_write()).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn proposal_count(&self) -> u64 {
        self.state().proposals.len() as u64
    }

    /// Whether `voter` has a recorded vote on `id`.
    pub fn has_voted(&self, id: ProposalId, voter: &WalletAddress) -> bool {
        self.state().votes.contains_key(&(id, voter.clone()))
    }

    fn submit(&self, action: WriteAction, write: PendingWrite) -> Result<PendingTx, GatewayError> {
        let mut state = self.state();
        if let Some(reason) = &state.reject_submits {
            return Err(GatewayError::Rejected(reason.clone()));
        }
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&state.next_tx.to_be_bytes());
        state.next_tx += 1;
        let hash = TxHash::new(bytes);
        state.pending.insert(hash, write);
        Ok(PendingTx { hash, action })
    }
}

impl LedgerState {
    fn proposal_mut(&mut self, id: ProposalId) -> Option<&mut StoredProposal> {
        let index = usize::try_from(id.get()).ok()?.checked_sub(1)?;
        self.proposals.get_mut(index)
    }

    fn apply(&mut self, write: PendingWrite, now: Timestamp) -> Result<Vec<LedgerEvent>, String> {
        match write {
            PendingWrite::Create {
                signer,
                description,
            } => {
                let balance = self.balances.get(&signer).copied().unwrap_or_default();
                if balance.is_zero() {
                    return Err("proposer holds no governance tokens".into());
                }
                if description.trim().is_empty() {
                    return Err("description is empty".into());
                }
                let start_time = now;
                let end_time = now.plus_secs(self.voting_period_secs);
                self.proposals.push(StoredProposal {
                    creator: signer.clone(),
                    description,
                    for_votes: TokenAmount::ZERO,
                    against_votes: TokenAmount::ZERO,
                    start_time,
                    end_time,
                    executed: false,
                    passed: false,
                });
                Ok(vec![LedgerEvent::ProposalCreated {
                    proposal_id: ProposalId::new(self.proposals.len() as u64),
                    creator: signer,
                    start_time,
                    end_time,
                }])
            }
            PendingWrite::Vote {
                signer,
                id,
                support,
            } => {
                let weight = self.balances.get(&signer).copied().unwrap_or_default();
                if self.votes.contains_key(&(id, signer.clone())) {
                    return Err("already voted".into());
                }
                let proposal = self.proposal_mut(id).ok_or("proposal does not exist")?;
                if proposal.executed || now < proposal.start_time || now >= proposal.end_time {
                    return Err("voting is not active".into());
                }
                if weight.is_zero() {
                    return Err("no voting power".into());
                }
                if support {
                    proposal.for_votes = proposal.for_votes.saturating_add(weight);
                } else {
                    proposal.against_votes = proposal.against_votes.saturating_add(weight);
                }
                self.votes.insert((id, signer.clone()), support);
                Ok(vec![LedgerEvent::VoteCast {
                    voter: signer,
                    proposal_id: id,
                    support,
                    weight,
                }])
            }
            PendingWrite::Execute { id } => {
                let quorum = self.quorum;
                let proposal = self.proposal_mut(id).ok_or("proposal does not exist")?;
                if proposal.executed {
                    return Err("proposal already executed".into());
                }
                if now < proposal.end_time {
                    return Err("voting period has not ended".into());
                }
                let turnout = proposal.for_votes.saturating_add(proposal.against_votes);
                proposal.executed = true;
                proposal.passed = proposal.for_votes > proposal.against_votes && turnout >= quorum;
                Ok(vec![LedgerEvent::ProposalExecuted {
                    proposal_id: id,
                    passed: proposal.passed,
                }])
            }
        }
    }
}

fn unreachable_node(what: &str) -> GatewayError {
    GatewayError::Transport(format!("scripted failure reading {what}"))
}

impl LedgerGateway for NullLedger {
    async fn read_proposal(&self, id: ProposalId) -> Result<RawProposal, GatewayError> {
        self.record(LedgerCall::ReadProposal(id));
        let mut state = self.state();
        if state.failing_reads.contains(&id) {
            return Err(unreachable_node(&format!("proposal {id}")));
        }
        if let Some(raw) = state.raw_overrides.get(&id) {
            return Ok(raw.clone());
        }
        state
            .proposal_mut(id)
            .map(|p| p.to_raw())
            .ok_or(GatewayError::NotFound(id))
    }

    async fn read_proposal_count(&self) -> Result<u64, GatewayError> {
        self.record(LedgerCall::ReadProposalCount);
        let state = self.state();
        if state.fail_count {
            return Err(unreachable_node("proposal count"));
        }
        Ok(state.proposals.len() as u64)
    }

    async fn read_has_voted(
        &self,
        id: ProposalId,
        voter: &WalletAddress,
    ) -> Result<bool, GatewayError> {
        self.record(LedgerCall::ReadHasVoted(id, voter.clone()));
        let state = self.state();
        if state.failing_reads.contains(&id) {
            return Err(unreachable_node(&format!("vote flag of proposal {id}")));
        }
        Ok(state.votes.contains_key(&(id, voter.clone())))
    }

    async fn read_token_decimals(&self) -> Result<u8, GatewayError> {
        self.record(LedgerCall::ReadTokenDecimals);
        let state = self.state();
        if state.fail_decimals {
            return Err(unreachable_node("token decimals"));
        }
        Ok(state.decimals)
    }

    async fn read_token_balance(&self, owner: &WalletAddress) -> Result<TokenAmount, GatewayError> {
        self.record(LedgerCall::ReadTokenBalance(owner.clone()));
        let state = self.state();
        if state.fail_balance {
            return Err(unreachable_node("token balance"));
        }
        Ok(state.balances.get(owner).copied().unwrap_or_default())
    }

    async fn read_quorum(&self) -> Result<TokenAmount, GatewayError> {
        self.record(LedgerCall::ReadQuorum);
        Ok(self.state().quorum)
    }

    async fn read_voting_period(&self) -> Result<u64, GatewayError> {
        self.record(LedgerCall::ReadVotingPeriod);
        Ok(self.state().voting_period_secs)
    }

    async fn submit_create(
        &self,
        signer: &WalletAddress,
        description: &str,
    ) -> Result<PendingTx, GatewayError> {
        self.record(LedgerCall::SubmitCreate(signer.clone()));
        self.submit(
            WriteAction::CreateProposal,
            PendingWrite::Create {
                signer: signer.clone(),
                description: description.to_string(),
            },
        )
    }

    async fn submit_vote(
        &self,
        signer: &WalletAddress,
        id: ProposalId,
        support: bool,
    ) -> Result<PendingTx, GatewayError> {
        self.record(LedgerCall::SubmitVote(signer.clone(), id, support));
        self.submit(
            WriteAction::CastVote,
            PendingWrite::Vote {
                signer: signer.clone(),
                id,
                support,
            },
        )
    }

    async fn submit_execute(
        &self,
        signer: &WalletAddress,
        id: ProposalId,
    ) -> Result<PendingTx, GatewayError> {
        self.record(LedgerCall::SubmitExecute(signer.clone(), id));
        self.submit(WriteAction::ExecuteProposal, PendingWrite::Execute { id })
    }

    async fn await_confirmation(&self, pending: &PendingTx) -> Result<Receipt, GatewayError> {
        self.record(LedgerCall::AwaitConfirmation(pending.hash));
        loop {
            let released = self.released.notified();
            if !self.state().hold_confirmations {
                break;
            }
            released.await;
        }

        let now = self.clock.now();
        let mut state = self.state();
        let write = state
            .pending
            .remove(&pending.hash)
            .ok_or_else(|| GatewayError::Dropped(pending.hash.to_string()))?;
        if std::mem::take(&mut state.drop_next) {
            return Err(GatewayError::Dropped(pending.hash.to_string()));
        }
        let (status, events) = match state.revert_next.take() {
            Some(reason) => (TxStatus::Reverted { reason }, Vec::new()),
            None => match state.apply(write, now) {
                Ok(events) => (TxStatus::Confirmed, events),
                Err(reason) => (TxStatus::Reverted { reason }, Vec::new()),
            },
        };
        let events = if state.omit_events { Vec::new() } else { events };
        Ok(Receipt {
            tx: pending.hash,
            status,
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> WalletAddress {
        WalletAddress::parse("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap()
    }

    fn ledger_at(now: u64) -> NullLedger {
        NullLedger::new(Arc::new(NullClock::new(now)))
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let ledger = ledger_at(1_000);
        ledger.set_balance(&alice(), TokenAmount::new(5));
        for expected in 1..=2u64 {
            let pending = ledger.submit_create(&alice(), "hello").await.unwrap();
            let receipt = ledger.await_confirmation(&pending).await.unwrap();
            assert!(receipt.is_confirmed());
            assert_eq!(receipt.created_proposal(), Some(ProposalId::new(expected)));
        }
        assert_eq!(ledger.read_proposal_count().await.unwrap(), 2);
        let raw = ledger.read_proposal(ProposalId::new(1)).await.unwrap();
        assert_eq!(raw.start_time, Some(json!(1_000)));
        assert_eq!(raw.end_time, Some(json!(1_000 + DEFAULT_VOTING_PERIOD_SECS)));
    }

    #[tokio::test]
    async fn vote_weighted_by_balance_and_only_once() {
        let ledger = ledger_at(150);
        ledger.set_balance(&alice(), TokenAmount::new(7));
        let id = ledger.seed_proposal(&alice(), "x", Timestamp::new(100), Timestamp::new(200));

        let pending = ledger.submit_vote(&alice(), id, true).await.unwrap();
        assert!(ledger.await_confirmation(&pending).await.unwrap().is_confirmed());
        assert!(ledger.read_has_voted(id, &alice()).await.unwrap());

        let pending = ledger.submit_vote(&alice(), id, false).await.unwrap();
        let receipt = ledger.await_confirmation(&pending).await.unwrap();
        assert_eq!(
            receipt.status,
            TxStatus::Reverted {
                reason: "already voted".into()
            }
        );
        let raw = ledger.read_proposal(id).await.unwrap();
        assert_eq!(raw.for_votes, Some(json!("7")));
        assert_eq!(raw.against_votes, Some(json!("0")));
    }

    #[tokio::test]
    async fn execute_before_end_reverts() {
        let ledger = ledger_at(150);
        let id = ledger.seed_proposal(&alice(), "x", Timestamp::new(100), Timestamp::new(200));
        let pending = ledger.submit_execute(&alice(), id).await.unwrap();
        let receipt = ledger.await_confirmation(&pending).await.unwrap();
        assert!(!receipt.is_confirmed());
        assert_eq!(ledger.read_proposal(id).await.unwrap().executed, Some(false));

        ledger.clock().set(200);
        let pending = ledger.submit_execute(&alice(), id).await.unwrap();
        assert!(ledger.await_confirmation(&pending).await.unwrap().is_confirmed());
        assert_eq!(ledger.read_proposal(id).await.unwrap().executed, Some(true));
    }

    #[tokio::test]
    async fn quorum_gates_passing() {
        let ledger = ledger_at(300);
        ledger.set_quorum(TokenAmount::new(100));
        let id = ledger.seed_proposal(&alice(), "x", Timestamp::new(100), Timestamp::new(200));
        ledger.seed_tally(id, TokenAmount::new(60), TokenAmount::new(10));
        let pending = ledger.submit_execute(&alice(), id).await.unwrap();
        let receipt = ledger.await_confirmation(&pending).await.unwrap();
        assert_eq!(
            receipt.events,
            vec![LedgerEvent::ProposalExecuted {
                proposal_id: id,
                passed: false
            }]
        );
    }

    #[tokio::test]
    async fn scripted_failures() {
        let ledger = ledger_at(0);
        let id = ledger.seed_proposal(&alice(), "x", Timestamp::new(0), Timestamp::new(10));
        ledger.fail_reads_of(id);
        assert!(matches!(
            ledger.read_proposal(id).await,
            Err(GatewayError::Transport(_))
        ));
        ledger.heal_reads_of(id);
        assert!(ledger.read_proposal(id).await.is_ok());
        assert!(matches!(
            ledger.read_proposal(ProposalId::new(9)).await,
            Err(GatewayError::NotFound(_))
        ));

        ledger.reject_submits(Some("nonce too low"));
        assert!(matches!(
            ledger.submit_execute(&alice(), id).await,
            Err(GatewayError::Rejected(_))
        ));
        ledger.reject_submits(None);

        ledger.drop_next();
        let pending = ledger.submit_execute(&alice(), id).await.unwrap();
        assert!(matches!(
            ledger.await_confirmation(&pending).await,
            Err(GatewayError::Dropped(_))
        ));
        assert_eq!(ledger.write_count(), 2);
    }

    #[tokio::test]
    async fn held_confirmation_waits_for_release() {
        let ledger = Arc::new(ledger_at(0));
        ledger.set_balance(&alice(), TokenAmount::new(1));
        ledger.hold_confirmations();
        let pending = ledger.submit_create(&alice(), "held").await.unwrap();

        let waiter = {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move { ledger.await_confirmation(&pending).await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());
        assert_eq!(ledger.proposal_count(), 0);

        ledger.release_confirmations();
        let receipt = waiter.await.unwrap().unwrap();
        assert!(receipt.is_confirmed());
        assert_eq!(ledger.proposal_count(), 1);
    }
}
