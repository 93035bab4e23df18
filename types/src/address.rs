//! Wallet address type: a `0x`-prefixed 20-byte hex account identifier.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// An account address on the governance ledger.
///
/// Stored lowercase so that two spellings of the same account compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// The standard prefix for all ledger addresses.
    pub const PREFIX: &'static str = "0x";

    /// Number of hex digits following the prefix.
    pub const HEX_LEN: usize = 40;

    /// Parse and normalise an address string.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let trimmed = raw.trim();
        let body = trimmed
            .strip_prefix(Self::PREFIX)
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| TypesError::InvalidAddress(raw.to_string()))?;
        if body.len() != Self::HEX_LEN || !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypesError::InvalidAddress(raw.to_string()));
        }
        Ok(Self(format!("{}{}", Self::PREFIX, body.to_ascii_lowercase())))
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for list views, e.g. `0x1234...abcd`.
    pub fn short(&self) -> String {
        format!("{}...{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WalletAddress {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl<'de> Deserialize<'de> for WalletAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
