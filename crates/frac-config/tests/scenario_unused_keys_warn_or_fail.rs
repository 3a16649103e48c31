//! Unused config keys
//!
//! GREEN when:
//! - A config using only consumed keys reports clean under both policies.
//! - An unknown leaf is reported under Warn and fails under Fail with CONFIG_UNUSED_KEYS.
//! - Prefix matching respects pointer-token boundaries.

use frac_config::{load_layered_yaml_from_strings, report_unused_keys, UnusedKeyPolicy};

const CLEAN_YAML: &str = r#"
contract:
  address: "0xFrac"
  collection: "0xNft"
  token_id: 1
buyer:
  address: "0xBuyer"
flow:
  ledger_read_attempts: 2
"#;

const DIRTY_YAML: &str = r#"
flow:
  ledger_read_attempts: 2
  ledger_read_attemptsx: 5
  retry_submit: true
ui:
  theme: "dark"
"#;

#[test]
fn clean_config_passes_both_policies() {
    let loaded = load_layered_yaml_from_strings(&[CLEAN_YAML]).unwrap();
    let warn = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn).unwrap();
    assert!(warn.is_clean());
    assert!(report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).is_ok());
}

#[test]
fn warn_lists_unused_sorted() {
    let loaded = load_layered_yaml_from_strings(&[CLEAN_YAML, DIRTY_YAML]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn).unwrap();
    assert_eq!(
        report.unused_leaf_pointers,
        vec![
            "/flow/ledger_read_attemptsx".to_string(),
            "/flow/retry_submit".to_string(),
            "/ui/theme".to_string(),
        ]
    );
}

#[test]
fn fail_policy_errors() {
    let loaded = load_layered_yaml_from_strings(&[DIRTY_YAML]).unwrap();
    let err = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("CONFIG_UNUSED_KEYS"), "got: {msg}");
    assert!(msg.contains("3 unused"), "got: {msg}");
}
