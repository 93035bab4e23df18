use proptest::prelude::*;

use ballot_types::{ProposalId, Timestamp, TokenAmount, TxHash, WalletAddress};

proptest! {
    /// TxHash hex roundtrip: Display -> from_hex produces identical hash.
    #[test]
    fn tx_hash_hex_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = TxHash::new(bytes);
        let parsed = TxHash::from_hex(&hash.to_string()).unwrap();
        prop_assert_eq!(parsed.as_bytes(), &bytes);
    }

    /// TxHash::is_zero is true only for all-zero bytes.
    #[test]
    fn tx_hash_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        let hash = TxHash::new(bytes);
        prop_assert_eq!(hash.is_zero(), bytes == [0u8; 32]);
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// remaining_from + elapsed_since agree on the distance between two instants.
    #[test]
    fn timestamp_distance(base in 0u64..1_000_000, offset in 0u64..1_000_000) {
        let start = Timestamp::new(base);
        let end = Timestamp::new(base + offset);
        prop_assert_eq!(end.remaining_from(start), offset);
        prop_assert_eq!(start.elapsed_since(end), offset);
    }

    /// Formatted amounts always carry exactly one decimal point.
    #[test]
    fn token_amount_format_shape(raw in 0u128..u128::MAX, decimals in 0u8..=40) {
        let shown = TokenAmount::new(raw).format_units(decimals);
        prop_assert_eq!(shown.matches('.').count(), 1);
        prop_assert!(!shown.starts_with('.'));
    }

    /// Shares of a split total never exceed 10_000 bps together.
    #[test]
    fn share_bps_bounded(a in 0u128..u128::MAX / 2, b in 0u128..u128::MAX / 2) {
        let total = TokenAmount::new(a + b);
        let sum = TokenAmount::new(a).share_bps(total) + TokenAmount::new(b).share_bps(total);
        prop_assert!(sum <= 10_000);
    }

    /// ProposalId::range(n) yields exactly 1..=n.
    #[test]
    fn proposal_range_contiguous(n in 0u64..500) {
        let ids: Vec<u64> = ProposalId::range(n).map(|id| id.get()).collect();
        prop_assert_eq!(ids, (1..=n).collect::<Vec<_>>());
    }

    /// Address parsing accepts any 40-hex-digit body and normalises case.
    #[test]
    fn address_parse_normalises(bytes in prop::array::uniform20(0u8..)) {
        let body: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
        let addr = WalletAddress::parse(&format!("0x{body}")).unwrap();
        prop_assert_eq!(addr.as_str(), format!("0x{}", body.to_lowercase()));
    }
}
