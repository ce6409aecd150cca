//! Scenario: the config hash identifies the effective config, nothing else.
//!
//! # Invariants under test
//!
//! 1. The same input always hashes the same.
//! 2. Key order in the YAML source never changes the hash.
//! 3. Different effective values produce different hashes.
//! 4. Overlay layers merge deterministically and the overlay wins.

use convoy_config::load_layered_yaml_from_strings;

const BASE_YAML: &str = r#"
daemon:
  listen_addr: "0.0.0.0:8080"
  store: "memory"
db:
  url_env: "CONVOY_DATABASE_URL"
log:
  filter: "info,convoy_dispatch=debug"
"#;

/// Same content as BASE_YAML with every mapping reordered.
const BASE_YAML_REORDERED: &str = r#"
log:
  filter: "info,convoy_dispatch=debug"
db:
  url_env: "CONVOY_DATABASE_URL"
daemon:
  store: "memory"
  listen_addr: "0.0.0.0:8080"
"#;

const OVERLAY_YAML: &str = r#"
daemon:
  store: "postgres"
"#;

#[test]
fn same_input_produces_identical_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
}

#[test]
fn reordered_keys_produce_the_same_hash() {
    let original = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let reordered = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();
    assert_eq!(
        original.config_hash, reordered.config_hash,
        "canonicalization must erase source key order"
    );
    assert_eq!(original.canonical_json, reordered.canonical_json);
}

#[test]
fn different_values_produce_different_hashes() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let modified = BASE_YAML.replace("0.0.0.0:8080", "127.0.0.1:9090");
    let b = load_layered_yaml_from_strings(&[modified.as_str()]).unwrap();
    assert_ne!(a.config_hash, b.config_hash);
}

#[test]
fn overlay_merges_deterministically_and_wins() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);

    let store = a
        .config_json
        .pointer("/daemon/store")
        .and_then(|v| v.as_str())
        .unwrap();
    assert_eq!(store, "postgres", "overlay should override daemon.store");

    // Sibling keys under the same mapping survive the merge.
    let addr = a
        .config_json
        .pointer("/daemon/listen_addr")
        .and_then(|v| v.as_str())
        .unwrap();
    assert_eq!(addr, "0.0.0.0:8080");
}

#[test]
fn hash_is_64_lowercase_hex_chars() {
    let loaded = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(loaded.config_hash.len(), 64);
    assert!(loaded
        .config_hash
        .chars()
        .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn empty_config_produces_a_stable_hash() {
    let a = load_layered_yaml_from_strings(&["{}"]).unwrap();
    let b = load_layered_yaml_from_strings(&["{}"]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
}
