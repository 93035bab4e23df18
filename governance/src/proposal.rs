//! The normalised proposal view model and its derived status.

use ballot_types::{ProposalId, Timestamp, TokenAmount, WalletAddress};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::content::ProposalContent;

/// Display status of a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    /// Voting window open, not executed.
    Active,
    /// Not executed and outside the voting window (awaiting execution, or not yet open).
    Pending,
    /// Executed and passed.
    Passed,
    /// Executed and rejected.
    Rejected,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Passed => "passed",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A snapshot of one proposal, rebuilt from the ledger on every fetch.
///
/// Snapshots are never updated in place; a newer read replaces the whole value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub creator: WalletAddress,
    /// Description text exactly as stored on the ledger.
    pub description_raw: String,
    /// Display sections parsed out of `description_raw`.
    pub content: ProposalContent,
    pub for_votes: TokenAmount,
    pub against_votes: TokenAmount,
    /// Token decimals the vote amounts were read with.
    pub decimals: u8,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub executed: bool,
    /// Outcome; only meaningful when `executed` is true.
    pub passed: bool,
    /// Whether the requesting wallet has voted. False for unauthenticated reads.
    pub has_voted: bool,
    /// `start_time <= now < end_time && !executed` at the time of the read.
    pub is_active: bool,
}

impl Proposal {
    pub fn status(&self) -> ProposalStatus {
        match (self.executed, self.passed, self.is_active) {
            (true, true, _) => ProposalStatus::Passed,
            (true, false, _) => ProposalStatus::Rejected,
            (false, _, true) => ProposalStatus::Active,
            (false, _, false) => ProposalStatus::Pending,
        }
    }

    pub fn total_votes(&self) -> TokenAmount {
        self.for_votes.saturating_add(self.against_votes)
    }

    /// Share of the cast weight in favour, in basis points.
    pub fn for_share_bps(&self) -> u32 {
        self.for_votes.share_bps(self.total_votes())
    }

    /// Share of the cast weight against, in basis points.
    pub fn against_share_bps(&self) -> u32 {
        self.against_votes.share_bps(self.total_votes())
    }

    pub fn for_votes_display(&self) -> String {
        self.for_votes.format_units(self.decimals)
    }

    pub fn against_votes_display(&self) -> String {
        self.against_votes.format_units(self.decimals)
    }

    /// Whether the vote action should be offered to the requesting wallet.
    pub fn can_vote(&self) -> bool {
        self.is_active && !self.has_voted
    }

    /// Whether the execute action should be offered at `now`.
    ///
    /// This only gates presentation; the ledger has the final word.
    pub fn can_execute(&self, now: Timestamp) -> bool {
        !self.executed && now >= self.end_time
    }
}

/// Filters for proposal listings. All of them preserve creation order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalFilter {
    #[default]
    All,
    Active,
    /// Executed proposals, whatever their outcome.
    Completed,
    Passed,
    Rejected,
}

impl ProposalFilter {
    pub fn matches(&self, proposal: &Proposal) -> bool {
        match self {
            Self::All => true,
            Self::Active => proposal.is_active,
            Self::Completed => proposal.executed,
            Self::Passed => proposal.executed && proposal.passed,
            Self::Rejected => proposal.executed && !proposal.passed,
        }
    }

    pub fn apply(&self, proposals: Vec<Proposal>) -> Vec<Proposal> {
        proposals.into_iter().filter(|p| self.matches(p)).collect()
    }
}

impl FromStr for ProposalFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "passed" => Ok(Self::Passed),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown filter {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposal(id: u64, executed: bool, passed: bool, is_active: bool) -> Proposal {
        Proposal {
            id: ProposalId::new(id),
            creator: WalletAddress::parse("0x1111111111111111111111111111111111111111").unwrap(),
            description_raw: String::new(),
            content: ProposalContent::default(),
            for_votes: TokenAmount::new(30),
            against_votes: TokenAmount::new(10),
            decimals: 0,
            start_time: Timestamp::new(100),
            end_time: Timestamp::new(200),
            executed,
            passed,
            has_voted: false,
            is_active,
        }
    }

    #[test]
    fn status_badges() {
        assert_eq!(proposal(1, true, true, false).status(), ProposalStatus::Passed);
        assert_eq!(proposal(1, true, false, false).status(), ProposalStatus::Rejected);
        assert_eq!(proposal(1, false, false, true).status(), ProposalStatus::Active);
        assert_eq!(proposal(1, false, false, false).status(), ProposalStatus::Pending);
    }

    #[test]
    fn vote_shares() {
        let p = proposal(1, false, false, true);
        assert_eq!(p.for_share_bps(), 7_500);
        assert_eq!(p.against_share_bps(), 2_500);
        assert_eq!(p.for_votes_display(), "30.0");
    }

    #[test]
    fn vote_action_gated_on_window_and_prior_vote() {
        let mut p = proposal(1, false, false, true);
        assert!(p.can_vote());
        p.has_voted = true;
        assert!(!p.can_vote());
    }

    #[test]
    fn execute_action_gated_on_window_end() {
        let p = proposal(1, false, false, true);
        assert!(!p.can_execute(Timestamp::new(199)));
        assert!(p.can_execute(Timestamp::new(200)));
        let done = proposal(1, true, true, false);
        assert!(!done.can_execute(Timestamp::new(500)));
    }

    #[test]
    fn filters_preserve_order() {
        let all = vec![
            proposal(1, true, true, false),
            proposal(2, false, false, true),
            proposal(3, true, false, false),
            proposal(4, false, false, false),
            proposal(5, true, true, false),
        ];
        let ids = |f: ProposalFilter| -> Vec<u64> {
            f.apply(all.clone()).iter().map(|p| p.id.get()).collect()
        };
        assert_eq!(ids(ProposalFilter::All), vec![1, 2, 3, 4, 5]);
        assert_eq!(ids(ProposalFilter::Active), vec![2]);
        assert_eq!(ids(ProposalFilter::Completed), vec![1, 3, 5]);
        assert_eq!(ids(ProposalFilter::Passed), vec![1, 5]);
        assert_eq!(ids(ProposalFilter::Rejected), vec![3]);
    }

    #[test]
    fn filter_from_str() {
        assert_eq!("Completed".parse::<ProposalFilter>().unwrap(), ProposalFilter::Completed);
        assert!("closed".parse::<ProposalFilter>().is_err());
    }
}
