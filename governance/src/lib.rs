//! Governance client core.
//!
//! Turns raw ledger records into proposal snapshots, lists them with bounded
//! concurrency, drives the create / vote / execute write paths through to
//! confirmation, and aggregates outcomes.
//!
//! All durable state lives on the ledger. Nothing here caches between calls;
//! the only shared mutable state is the per-(proposal, voter) reentrancy guard.

pub mod builder;
pub mod client;
pub mod content;
pub mod error;
pub mod inflight;
pub mod params;
pub mod proposal;
pub mod repository;
pub mod session;
pub mod spans;
pub mod tally;
pub mod workflow;

pub use builder::ProposalBuilder;
pub use client::GovernanceClient;
pub use content::ProposalContent;
pub use error::{GovernanceError, ValidationError};
pub use inflight::{OperationKey, OperationPhase, OperationScope};
pub use params::GovernanceParams;
pub use proposal::{Proposal, ProposalFilter, ProposalStatus};
pub use repository::{FetchFailure, ProposalBatch, ProposalRepository, DEFAULT_FETCH_CONCURRENCY};
pub use session::WalletSession;
pub use tally::{aggregate, TallyResult};
pub use workflow::{VotingWorkflow, WriteOutcome};
