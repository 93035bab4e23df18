//! Pre-built [`tracing::Span`] constructors for governance operations.
//!
//! Consistent span names and fields make it easy to correlate the submit,
//! confirm and refresh steps of one write in the logs.

use ballot_gateway::WriteAction;
use ballot_types::WalletAddress;
use tracing::{info_span, Span};

/// Span covering one write operation from validation to refresh.
pub fn write_span(action: WriteAction, voter: &WalletAddress) -> Span {
    info_span!("governance_write", action = %action, voter = %voter)
}

/// Span covering a full proposal collection fetch.
pub fn fetch_all_span(count: u64) -> Span {
    info_span!("fetch_all", count = count)
}
