//! Scenario: malformed raw ledgers never become snapshots
//!
//! # Invariants under test
//!
//! 1. sum(shares) = 9 with total_shares = 10 → `SumMismatch`, no snapshot.
//! 2. sum(shares) above total_shares is rejected the same way.
//! 3. Every snapshot that does get built satisfies sum == total_shares.
//! 4. The error's Display carries both numbers for operator logs.

use frac_ledger::*;

fn raw(holders: &[(&str, i64)], total: i64) -> RawLedger {
    RawLedger {
        holders: holders.iter().map(|(a, _)| Address::new(*a)).collect(),
        shares: holders.iter().map(|(_, s)| *s).collect(),
        total_shares: total,
        creator: Address::new("0xOwner"),
        current_owner: Address::new("0xOwner"),
        share_price_wei: 1_000,
    }
}

#[test]
fn short_sum_fails_with_malformed_ledger() {
    let err = ShareLedgerSnapshot::from_raw(raw(&[("0xOwner", 6), ("0xAlice", 3)], 10))
        .expect_err("sum 9 != total 10 must not produce a snapshot");
    assert_eq!(
        err,
        MalformedLedger::SumMismatch {
            sum: 9,
            total_shares: 10
        }
    );
}

#[test]
fn excess_sum_fails_with_malformed_ledger() {
    let err = ShareLedgerSnapshot::from_raw(raw(&[("0xOwner", 8), ("0xAlice", 3)], 10))
        .expect_err("sum 11 != total 10 must not produce a snapshot");
    assert!(matches!(err, MalformedLedger::SumMismatch { sum: 11, .. }));
}

#[test]
fn built_snapshots_always_sum_to_total() {
    let layouts: &[(&[(&str, i64)], i64)] = &[
        (&[("0xOwner", 100)], 100),
        (&[("0xOwner", 7), ("0xBuyer", 3)], 10),
        (&[("0xa", 1), ("0xb", 1), ("0xc", 0), ("0xd", 8)], 10),
    ];

    for (holders, total) in layouts {
        let snap = ShareLedgerSnapshot::from_raw(raw(holders, *total)).unwrap();
        let sum: u64 = snap.holders().iter().map(|h| h.shares).sum();
        assert_eq!(sum, snap.total_shares());
    }
}

#[test]
fn display_names_both_sides_of_the_mismatch() {
    let err = ShareLedgerSnapshot::from_raw(raw(&[("0xOwner", 9)], 10)).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains('9') && msg.contains("10"), "got: {msg}");
}

#[test]
fn raw_ledger_parses_from_json_with_string_price() {
    let json = r#"{
        "holders": ["0xOwner", "0xAlice"],
        "shares": [7, 3],
        "total_shares": 10,
        "creator": "0xOwner",
        "current_owner": "0xOwner",
        "share_price_wei": "1000000000000000000"
    }"#;
    let r: RawLedger = serde_json::from_str(json).unwrap();
    let snap = ShareLedgerSnapshot::from_raw(r).unwrap();
    assert_eq!(snap.share_price_wei(), 1_000_000_000_000_000_000);
}
