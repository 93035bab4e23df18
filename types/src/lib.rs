//! Fundamental types for the ballot governance client.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! proposal ids, wallet addresses, token amounts, timestamps and transaction hashes.

pub mod address;
pub mod amount;
pub mod error;
pub mod hash;
pub mod id;
pub mod time;

pub use address::WalletAddress;
pub use amount::TokenAmount;
pub use error::TypesError;
pub use hash::TxHash;
pub use id::ProposalId;
pub use time::{Clock, SystemClock, Timestamp};
