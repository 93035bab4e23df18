//! Reentrancy guard for write operations.
//!
//! At most one write per `(scope, voter)` may be between submission and
//! completion. The guard is an RAII value: it is released when dropped, so a
//! caller abandoning the operation future releases it just like success or
//! failure does.

use ballot_types::{ProposalId, WalletAddress};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::ValidationError;

/// What a write operation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationScope {
    /// Creating a new proposal (no id exists yet).
    Creation,
    /// Voting on or executing an existing proposal.
    Proposal(ProposalId),
}

impl fmt::Display for OperationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Creation => f.write_str("proposal creation"),
            Self::Proposal(id) => write!(f, "proposal {id}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OperationKey {
    pub scope: OperationScope,
    pub voter: WalletAddress,
}

impl OperationKey {
    pub fn new(scope: OperationScope, voter: WalletAddress) -> Self {
        Self { scope, voter }
    }
}

/// Where a write operation is in its lifecycle.
///
/// `Succeeded` and `Failed` are held only until the operation returns; the
/// key then reads as `Idle` again so the caller can retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationPhase {
    Idle,
    Submitting,
    Confirming,
    Succeeded,
    Failed,
}

/// Registry of operations currently in flight.
#[derive(Debug, Default)]
pub struct InFlight {
    ops: Mutex<HashMap<OperationKey, OperationPhase>>,
}

impl InFlight {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn ops(&self) -> MutexGuard<'_, HashMap<OperationKey, OperationPhase>> {
        self.ops.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Claim `key`, entering `Submitting`. Fails if the key is already claimed.
    pub fn begin(self: &Arc<Self>, key: OperationKey) -> Result<InFlightGuard, ValidationError> {
        let mut ops = self.ops();
        if ops.contains_key(&key) {
            return Err(ValidationError::OperationInFlight {
                scope: key.scope.to_string(),
            });
        }
        ops.insert(key.clone(), OperationPhase::Submitting);
        tracing::debug!(scope = %key.scope, voter = %key.voter, "operation submitting");
        Ok(InFlightGuard {
            registry: Arc::clone(self),
            key,
        })
    }

    pub fn phase(&self, key: &OperationKey) -> OperationPhase {
        self.ops().get(key).copied().unwrap_or(OperationPhase::Idle)
    }

    /// Number of claimed keys.
    pub fn len(&self) -> usize {
        self.ops().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Claim on one operation key. Dropping it returns the key to `Idle`.
#[derive(Debug)]
pub struct InFlightGuard {
    registry: Arc<InFlight>,
    key: OperationKey,
}

impl InFlightGuard {
    pub fn key(&self) -> &OperationKey {
        &self.key
    }

    pub fn set(&self, phase: OperationPhase) {
        tracing::debug!(scope = %self.key.scope, ?phase, "operation phase");
        if let Some(slot) = self.registry.ops().get_mut(&self.key) {
            *slot = phase;
        }
    }

    /// Record the terminal phase matching `result`.
    pub fn settle<T, E>(&self, result: &Result<T, E>) {
        self.set(match result {
            Ok(_) => OperationPhase::Succeeded,
            Err(_) => OperationPhase::Failed,
        });
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry.ops().remove(&self.key);
    }
}
