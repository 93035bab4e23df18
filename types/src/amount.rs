//! Governance token amounts.
//!
//! Amounts are represented as fixed-point integers (u128) to avoid floating-point errors.
//! The ledger reports values in raw units; the token's `decimals` value decides where
//! the decimal point goes when a value is shown to a person.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypesError;

/// Governance token weight in raw (smallest) units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Parse a raw ledger integer: decimal digits, or `0x`-prefixed hex.
    pub fn parse_raw(s: &str) -> Result<Self, TypesError> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u128::from_str_radix(hex, 16),
            None => s.parse::<u128>(),
        };
        parsed
            .map(Self)
            .map_err(|_| TypesError::InvalidAmount(s.to_string()))
    }

    /// Parse an unsigned ledger integer sent as JSON: a number, a decimal
    /// string or a `0x` hex string.
    ///
    /// JSON numbers are only exact up to `u64::MAX`; larger values must
    /// travel as strings and are rejected otherwise.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, TypesError> {
        match value {
            serde_json::Value::Number(n) => n
                .as_u64()
                .map(|v| Self(u128::from(v)))
                .ok_or_else(|| TypesError::InvalidAmount(n.to_string())),
            serde_json::Value::String(s) => Self::parse_raw(s),
            other => Err(TypesError::InvalidAmount(other.to_string())),
        }
    }

    /// Render as a decimal string with `decimals` fractional digits, trailing
    /// zeros trimmed but always keeping one digit after the point.
    ///
    /// Works on the digit string directly, so any `decimals` value is exact.
    pub fn format_units(&self, decimals: u8) -> String {
        let decimals = decimals as usize;
        let digits = self.0.to_string();
        let padded = if digits.len() <= decimals {
            format!("{digits:0>width$}", width = decimals + 1)
        } else {
            digits
        };
        let (whole, frac) = padded.split_at(padded.len() - decimals);
        let frac = frac.trim_end_matches('0');
        if frac.is_empty() {
            format!("{whole}.0")
        } else {
            format!("{whole}.{frac}")
        }
    }

    /// Share of `self` in `total`, in basis points (0..=10_000).
    ///
    /// Returns 0 when `total` is zero. Integer-only, so the result does not
    /// depend on floating-point rounding of large raw values.
    pub fn share_bps(&self, total: TokenAmount) -> u32 {
        if total.0 == 0 {
            return 0;
        }
        let part = self.0.min(total.0);
        let bps = match part.checked_mul(10_000) {
            Some(scaled) => scaled / total.0,
            None => part / (total.0 / 10_000),
        };
        bps.min(10_000) as u32
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} raw", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEI: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn format_whole_tokens() {
        assert_eq!(TokenAmount::new(30 * WEI).format_units(18), "30.0");
        assert_eq!(TokenAmount::ZERO.format_units(18), "0.0");
    }

    #[test]
    fn format_fractional_tokens() {
        assert_eq!(TokenAmount::new(15 * WEI / 10).format_units(18), "1.5");
        assert_eq!(TokenAmount::new(1).format_units(18), "0.000000000000000001");
        assert_eq!(TokenAmount::new(123_456).format_units(2), "1234.56");
    }

    #[test]
    fn format_zero_decimals() {
        assert_eq!(TokenAmount::new(42).format_units(0), "42.0");
    }

    #[test]
    fn format_is_exact_for_max_value() {
        let max = TokenAmount::new(u128::MAX);
        assert_eq!(
            max.format_units(18),
            "340282366920938463463.374607431768211455"
        );
    }

    #[test]
    fn format_with_decimals_beyond_u128_range() {
        assert_eq!(TokenAmount::new(5).format_units(40), format!("0.{}5", "0".repeat(39)));
    }

    #[test]
    fn parse_raw_decimal_and_hex() {
        assert_eq!(TokenAmount::parse_raw("1000").unwrap(), TokenAmount::new(1000));
        assert_eq!(TokenAmount::parse_raw("0x3e8").unwrap(), TokenAmount::new(1000));
        assert!(TokenAmount::parse_raw("-1").is_err());
        assert!(TokenAmount::parse_raw("").is_err());
        assert!(TokenAmount::parse_raw("1e18").is_err());
    }

    #[test]
    fn from_json_accepts_numbers_and_strings() {
        use serde_json::json;
        assert_eq!(TokenAmount::from_json(&json!(42)).unwrap(), TokenAmount::new(42));
        assert_eq!(TokenAmount::from_json(&json!("42")).unwrap(), TokenAmount::new(42));
        assert_eq!(TokenAmount::from_json(&json!("0x2a")).unwrap(), TokenAmount::new(42));
        assert_eq!(
            TokenAmount::from_json(&json!((30 * WEI).to_string())).unwrap(),
            TokenAmount::new(30 * WEI)
        );
    }

    #[test]
    fn from_json_rejects_inexact_numbers() {
        use serde_json::json;
        assert!(TokenAmount::from_json(&json!(-1)).is_err());
        assert!(TokenAmount::from_json(&json!(1.5)).is_err());
        assert!(TokenAmount::from_json(&json!(3.0e19)).is_err());
        assert!(TokenAmount::from_json(&json!(true)).is_err());
        assert!(TokenAmount::from_json(&serde_json::Value::Null).is_err());
    }

    #[test]
    fn share_bps_basic() {
        let total = TokenAmount::new(40);
        assert_eq!(TokenAmount::new(30).share_bps(total), 7_500);
        assert_eq!(TokenAmount::new(10).share_bps(total), 2_500);
        assert_eq!(TokenAmount::new(10).share_bps(TokenAmount::ZERO), 0);
    }

    #[test]
    fn share_bps_large_values_do_not_overflow() {
        let half = TokenAmount::new(u128::MAX / 2);
        let total = TokenAmount::new(u128::MAX - 1);
        let bps = half.share_bps(total);
        assert!((4_999..=5_000).contains(&bps), "got {bps}");
    }
}
