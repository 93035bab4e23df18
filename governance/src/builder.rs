//! Proposal view-model builder.
//!
//! The single point where raw ledger records become typed [`Proposal`]s.
//! Building is pure: the same record, decimals, time and vote flag always
//! produce the same snapshot.

use ballot_gateway::RawProposal;
use ballot_types::{ProposalId, Timestamp, TokenAmount, WalletAddress};
use serde_json::Value;

use crate::content::ProposalContent;
use crate::error::GovernanceError;
use crate::proposal::Proposal;

/// Builds proposal snapshots using the token decimals the ledger reported.
#[derive(Clone, Copy, Debug)]
pub struct ProposalBuilder {
    decimals: u8,
}

impl ProposalBuilder {
    pub fn new(decimals: u8) -> Self {
        Self { decimals }
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Validate `raw` and derive status flags relative to `now`.
    ///
    /// `caller_voted` is the ledger's vote flag for the requesting wallet, or
    /// `None` for an unauthenticated read (which reports `has_voted = false`).
    pub fn build(
        &self,
        id: ProposalId,
        raw: &RawProposal,
        now: Timestamp,
        caller_voted: Option<bool>,
    ) -> Result<Proposal, GovernanceError> {
        let malformed = |reason: String| GovernanceError::record_fetch(format!("proposal {id}"), reason);

        let creator = raw
            .creator
            .as_deref()
            .ok_or_else(|| malformed("missing creator".into()))?;
        let creator = WalletAddress::parse(creator).map_err(|e| malformed(e.to_string()))?;

        let for_votes = amount_field(&raw.for_votes, "forVotes").map_err(malformed)?;
        let against_votes = amount_field(&raw.against_votes, "againstVotes").map_err(malformed)?;
        let start_time = time_field(&raw.start_time, "startTime").map_err(malformed)?;
        let end_time = time_field(&raw.end_time, "endTime").map_err(malformed)?;
        if start_time >= end_time {
            return Err(malformed(format!(
                "voting window is empty: start {start_time} >= end {end_time}"
            )));
        }

        let executed = raw
            .executed
            .ok_or_else(|| malformed("missing executed flag".into()))?;
        let passed = raw
            .passed
            .ok_or_else(|| malformed("missing passed flag".into()))?;

        let description_raw = raw.description.clone().unwrap_or_default();
        let content = ProposalContent::parse(&description_raw);

        Ok(Proposal {
            id,
            creator,
            description_raw,
            content,
            for_votes,
            against_votes,
            decimals: self.decimals,
            start_time,
            end_time,
            executed,
            passed,
            has_voted: caller_voted.unwrap_or(false),
            is_active: is_active(start_time, end_time, executed, now),
        })
    }
}

/// Closed on `start`, open on `end`: a proposal stops being active the instant
/// `now == end`. Executed proposals are never active.
pub fn is_active(start: Timestamp, end: Timestamp, executed: bool, now: Timestamp) -> bool {
    !executed && start <= now && now < end
}

fn uint_field(value: &Option<Value>, name: &str) -> Result<u128, String> {
    match value {
        None | Some(Value::Null) => Err(format!("missing {name}")),
        Some(value) => TokenAmount::from_json(value)
            .map(|a| a.raw())
            .map_err(|e| format!("{name}: {e}")),
    }
}

fn amount_field(value: &Option<Value>, name: &str) -> Result<TokenAmount, String> {
    uint_field(value, name).map(TokenAmount::new)
}

fn time_field(value: &Option<Value>, name: &str) -> Result<Timestamp, String> {
    let raw = uint_field(value, name)?;
    u64::try_from(raw)
        .map(Timestamp::new)
        .map_err(|_| format!("{name} out of range: {raw}"))
}
