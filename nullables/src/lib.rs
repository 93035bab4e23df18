//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies (the clock and the governance ledger) sit behind
//! traits. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the network
//!
//! Usage: swap the real clock and gateway for nullables in tests.

pub mod clock;
pub mod ledger;

pub use clock::NullClock;
pub use ledger::{LedgerCall, NullLedger};
