//! Outcome statistics over executed proposals.

use serde::{Deserialize, Serialize};

use crate::proposal::Proposal;

/// Aggregate of executed proposals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyResult {
    /// Executed proposals in the input.
    pub total: u64,
    pub passed: u64,
    pub rejected: u64,
    /// `passed / total` as a whole percentage, rounded half up.
    /// `None` when `total == 0`.
    pub pass_rate: Option<u8>,
}

impl TallyResult {
    pub fn has_outcomes(&self) -> bool {
        self.total > 0
    }
}

/// Count outcomes over the executed members of `proposals`.
///
/// Proposals that have not been executed carry no outcome and are ignored.
pub fn aggregate<'a, I>(proposals: I) -> TallyResult
where
    I: IntoIterator<Item = &'a Proposal>,
{
    let (passed, rejected) = proposals
        .into_iter()
        .filter(|p| p.executed)
        .fold((0u64, 0u64), |(yes, no), p| {
            if p.passed {
                (yes + 1, no)
            } else {
                (yes, no + 1)
            }
        });
    let total = passed + rejected;
    TallyResult {
        total,
        passed,
        rejected,
        pass_rate: pass_rate(passed, total),
    }
}

fn pass_rate(passed: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let (passed, total) = (u128::from(passed), u128::from(total));
    let pct = (passed * 200 + total) / (2 * total);
    u8::try_from(pct).ok()
}
