//! `frac config-hash`
//!
//! GREEN when:
//! - The hash printed for layered files is stable and 64 hex chars.
//! - A secret literal in any layer fails with CONFIG_SECRET_DETECTED.
//! - `--strict` turns unused keys into a CONFIG_UNUSED_KEYS failure.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

const BASE_YAML: &str = r#"
contract:
  address: "0x5FbDB2315678afecb367f032d93F642f64180aa3"
  collection: "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"
  token_id: 1
buyer:
  address: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
"#;

fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path.to_string_lossy().to_string()
}

fn frac() -> Command {
    let mut cmd = Command::cargo_bin("frac").unwrap();
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn hash_is_stable_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let base = write(&dir, "base.yaml", BASE_YAML);
    let over = write(&dir, "over.yaml", "flow:\n  ledger_read_attempts: 5\n");

    let first = frac().args(["config-hash", &base, &over]).output().unwrap();
    let second = frac().args(["config-hash", &base, &over]).output().unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);

    let stdout = String::from_utf8(first.stdout).unwrap();
    let hash_line = stdout.lines().next().unwrap();
    let hash = hash_line.strip_prefix("config_hash=").unwrap();
    assert_eq!(hash.len(), 64);
    assert!(stdout.contains("\"ledger_read_attempts\":5"));
}

#[test]
fn secret_literal_fails() {
    let dir = tempfile::tempdir().unwrap();
    let base = write(&dir, "base.yaml", BASE_YAML);
    let bad = write(
        &dir,
        "bad.yaml",
        "buyer:\n  key: \"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80\"\n",
    );

    frac()
        .args(["config-hash", &base, &bad])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_SECRET_DETECTED"))
        .stderr(predicate::str::contains("ac0974bec39a").not());
}

#[test]
fn strict_rejects_unused_keys() {
    let dir = tempfile::tempdir().unwrap();
    let base = write(&dir, "base.yaml", BASE_YAML);
    let extra = write(&dir, "extra.yaml", "ui:\n  theme: dark\n");

    frac()
        .args(["config-hash", &base, &extra])
        .assert()
        .success();

    frac()
        .args(["config-hash", "--strict", &base, &extra])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_UNUSED_KEYS"));
}
