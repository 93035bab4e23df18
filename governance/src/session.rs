//! Wallet session capability.
//!
//! A session is the caller's connection to a wallet. It is handed explicitly
//! to every operation that needs an account; nothing reaches for a global.

use ballot_types::WalletAddress;
use std::sync::RwLock;

/// The connected account, if any.
///
/// Connect and disconnect may happen at any time; operations read the
/// address once at their start and keep using that value.
#[derive(Debug, Default)]
pub struct WalletSession {
    account: RwLock<Option<WalletAddress>>,
}

impl WalletSession {
    /// A session with no account connected.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// A session already connected to `address`.
    pub fn connected(address: WalletAddress) -> Self {
        Self {
            account: RwLock::new(Some(address)),
        }
    }

    /// Connect (or switch) to `address`.
    pub fn connect(&self, address: WalletAddress) {
        tracing::debug!(account = %address, "wallet connected");
        *self.account.write().unwrap_or_else(|e| e.into_inner()) = Some(address);
    }

    pub fn disconnect(&self) {
        tracing::debug!("wallet disconnected");
        *self.account.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn address(&self) -> Option<WalletAddress> {
        self.account
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_connected(&self) -> bool {
        self.address().is_some()
    }
}
