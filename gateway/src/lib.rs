//! Ledger gateway capability for the ballot governance client.
//!
//! The governance contract lives on an external, authoritative ledger. Every
//! backend (JSON-RPC node, in-memory ledger for testing) implements
//! [`LedgerGateway`]; the rest of the workspace depends only on the trait.
//!
//! Writes are two-phase: a `submit_*` call returns once the ledger has
//! accepted the transaction into its pending pool, and
//! [`LedgerGateway::await_confirmation`] resolves once it is durably
//! confirmed or reverted.

pub mod error;
pub mod receipt;
pub mod record;

pub use error::GatewayError;
pub use receipt::{LedgerEvent, PendingTx, Receipt, TxStatus, WriteAction};
pub use record::RawProposal;

use ballot_types::{ProposalId, TokenAmount, WalletAddress};
use std::future::Future;

/// Read and write access to the governance contract.
///
/// Write calls take the signing account explicitly; the gateway is expected
/// to hold whatever key material or wallet connection signs for it.
pub trait LedgerGateway: Send + Sync {
    /// Read one proposal record.
    fn read_proposal(
        &self,
        id: ProposalId,
    ) -> impl Future<Output = Result<RawProposal, GatewayError>> + Send;

    /// Number of proposals created so far (ids run `1..=count`).
    fn read_proposal_count(&self) -> impl Future<Output = Result<u64, GatewayError>> + Send;

    /// Whether `voter` has a vote recorded on proposal `id`.
    fn read_has_voted(
        &self,
        id: ProposalId,
        voter: &WalletAddress,
    ) -> impl Future<Output = Result<bool, GatewayError>> + Send;

    /// Decimals of the governance token that vote weights are denominated in.
    fn read_token_decimals(&self) -> impl Future<Output = Result<u8, GatewayError>> + Send;

    /// Governance token balance of `owner`, in raw units.
    fn read_token_balance(
        &self,
        owner: &WalletAddress,
    ) -> impl Future<Output = Result<TokenAmount, GatewayError>> + Send;

    /// Minimum participation for an outcome to count, in raw token units.
    fn read_quorum(&self) -> impl Future<Output = Result<TokenAmount, GatewayError>> + Send;

    /// Length of a proposal's voting window in seconds.
    fn read_voting_period(&self) -> impl Future<Output = Result<u64, GatewayError>> + Send;

    /// Submit a new proposal on behalf of `signer`.
    fn submit_create(
        &self,
        signer: &WalletAddress,
        description: &str,
    ) -> impl Future<Output = Result<PendingTx, GatewayError>> + Send;

    /// Submit a vote on behalf of `signer`.
    fn submit_vote(
        &self,
        signer: &WalletAddress,
        id: ProposalId,
        support: bool,
    ) -> impl Future<Output = Result<PendingTx, GatewayError>> + Send;

    /// Submit execution (finalisation) of a proposal on behalf of `signer`.
    fn submit_execute(
        &self,
        signer: &WalletAddress,
        id: ProposalId,
    ) -> impl Future<Output = Result<PendingTx, GatewayError>> + Send;

    /// Wait until a pending transaction is confirmed or reverted.
    ///
    /// Fails with [`GatewayError::Dropped`] if the transaction leaves the
    /// pending pool without being included.
    fn await_confirmation(
        &self,
        pending: &PendingTx,
    ) -> impl Future<Output = Result<Receipt, GatewayError>> + Send;
}
