//! Plain-text rendering of proposals, outcomes and parameters.

use ballot_governance::{GovernanceParams, Proposal, TallyResult, WriteOutcome};
use ballot_types::Timestamp;
use ballot_utils::{format_duration, format_time_left};
use std::fmt::Write;

/// Longest description shown in list views before truncation.
pub const SUMMARY_CHARS: usize = 50;

/// `text` cut to `max` characters with a trailing "..." when it was longer.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Basis points as a percentage with two decimals, e.g. `7500` -> `75.00%`.
pub fn percent(bps: u32) -> String {
    format!("{}.{:02}%", bps / 100, bps % 100)
}

fn summary(p: &Proposal) -> String {
    let text = if p.content.description.is_empty() {
        p.description_raw.as_str()
    } else {
        p.content.description.as_str()
    };
    truncate(&text.replace('\n', " "), SUMMARY_CHARS)
}

/// One line per proposal for list views.
pub fn proposal_line(p: &Proposal, now: Timestamp) -> String {
    let timing = if p.executed {
        String::new()
    } else {
        format!("  {}", format_time_left(p.end_time, now))
    };
    format!(
        "{:<6} {:<9} {}  [for {} / against {}]{}",
        p.id.to_string(),
        p.status().as_str(),
        summary(p),
        p.for_votes_display(),
        p.against_votes_display(),
        timing,
    )
}

/// Full detail view of one proposal.
pub fn proposal_detail(p: &Proposal, now: Timestamp) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Proposal {}  ({})", p.id, p.status());
    let _ = writeln!(out, "Creator:      {}", p.creator);
    if !p.content.content_url.is_empty() {
        let _ = writeln!(out, "Content URL:  {}", p.content.content_url);
    }
    let _ = writeln!(out, "Description:  {}", p.content.description);
    if !p.content.reason.is_empty() {
        let _ = writeln!(out, "Reason:       {}", p.content.reason);
    }
    let _ = writeln!(
        out,
        "For:          {} ({})",
        p.for_votes_display(),
        percent(p.for_share_bps())
    );
    let _ = writeln!(
        out,
        "Against:      {} ({})",
        p.against_votes_display(),
        percent(p.against_share_bps())
    );
    let _ = writeln!(out, "Window:       {} .. {}", p.start_time, p.end_time);
    if !p.executed {
        let _ = writeln!(out, "Time left:    {}", format_time_left(p.end_time, now));
    }
    let _ = writeln!(out, "You voted:    {}", if p.has_voted { "yes" } else { "no" });
    if p.can_vote() {
        let _ = writeln!(out, "Voting is open: `ballot vote {} --support for|against`", p.id.get());
    } else if p.can_execute(now) {
        let _ = writeln!(out, "Ready to execute: `ballot execute {}`", p.id.get());
    }
    out
}

pub fn tally(t: &TallyResult) -> String {
    let rate = match t.pass_rate {
        Some(rate) => format!("{rate}%"),
        None => "n/a".to_string(),
    };
    format!(
        "Executed:   {}\nPassed:     {}\nRejected:   {}\nPass rate:  {}\n",
        t.total, t.passed, t.rejected, rate
    )
}

pub fn params(p: &GovernanceParams) -> String {
    format!(
        "Quorum:         {}\nVoting period:  {} ({}s)\nToken decimals: {}\n",
        p.quorum_display(),
        format_duration(p.voting_period_secs),
        p.voting_period_secs,
        p.token_decimals
    )
}

/// Confirmation line for a vote or execution, plus the refreshed view if it loaded.
pub fn write_outcome(what: &str, outcome: &WriteOutcome, now: Timestamp) -> String {
    let mut out = format!("{what} confirmed in {}\n", outcome.tx());
    match &outcome.refreshed {
        Ok(p) => out.push_str(&proposal_detail(p, now)),
        Err(e) => {
            let _ = writeln!(out, "(could not refresh the proposal: {e})");
        }
    }
    out
}
