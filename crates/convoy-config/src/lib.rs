//! Layered YAML configuration for the fleet daemon.
//!
//! Config is loaded as an ordered list of YAML documents (base first,
//! overlays after), deep-merged into one JSON tree, then hashed. The
//! resulting `config_hash` is reported on `/api/status` so an operator can
//! tell at a glance which effective config a daemon is running.
//!
//! Two policies are enforced at load time:
//! - secret-looking literal values abort the load (config carries env var
//!   NAMES, the environment carries values);
//! - the canonical JSON form is deterministic, so the same effective config
//!   always hashes the same regardless of key order in the source files.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;

mod settings;

pub use settings::{DaemonSettings, StoreBackend, ENV_LISTEN_ADDR, ENV_STORE_BACKEND};

/// Known secret-like prefixes. A leaf string starting with any of these
/// aborts the load with CONFIG_SECRET_DETECTED.
const SECRET_PREFIXES: &[&str] = &[
    "sk-",        // Stripe / OpenAI style
    "sk_live",    // Stripe live
    "sk_test",    // Stripe test
    "AKIA",       // AWS access key ID
    "-----BEGIN", // PEM private keys
    "ghp_",       // GitHub PAT
    "gho_",       // GitHub OAuth
    "glpat-",     // GitLab PAT
    "xoxb-",      // Slack bot token
    "xoxp-",      // Slack user token
];

/// The merged, policy-checked config together with its identity.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// sha256 of `canonical_json`, lowercase hex.
    pub config_hash: String,
    /// Deterministic single-line JSON rendering of the merged tree.
    pub canonical_json: String,
    /// The merged tree itself, for pointer reads and typed extraction.
    pub config_json: Value,
}

/// Read and merge YAML files in order. Earlier paths are base layers,
/// later paths override.
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs = Vec::with_capacity(paths.len());
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }
    let doc_refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

/// Merge already-read YAML documents in order and run the load-time
/// policies. This is the whole loader; the path variant only adds IO.
pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let layer: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let layer = serde_json::to_value(layer).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, layer);
    }

    reject_secret_literals(&merged, "")?;

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

/// Recursive merge: objects merge key-wise, everything else is replaced by
/// the overlay value. An overlay null therefore overwrites, it does not
/// delete.
fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (k, o_val) in overlay_map {
                let b_val = base_map.remove(&k).unwrap_or(Value::Null);
                base_map.insert(k, deep_merge(b_val, o_val));
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Single-line JSON with sorted object keys. `serde_json::Value` maps are
/// BTree-backed (the preserve_order feature is off), so plain serialization
/// is already key-ordered and the hash is stable across source key order.
fn canonicalize_json(v: &Value) -> Result<String> {
    serde_json::to_string(v).context("canonical json serialize failed")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Walk the tree and refuse any leaf string that looks like a credential.
/// The error names the JSON pointer of the offending leaf, never the value.
fn reject_secret_literals(v: &Value, pointer: &str) -> Result<()> {
    match v {
        Value::Object(map) => {
            for (k, child) in map {
                let next = format!("{pointer}/{}", escape_pointer_token(k));
                reject_secret_literals(child, &next)?;
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                let next = format!("{pointer}/{i}");
                reject_secret_literals(child, &next)?;
            }
        }
        Value::String(s) if looks_like_secret(s) => {
            bail!("CONFIG_SECRET_DETECTED leaf={pointer} value=REDACTED");
        }
        _ => {}
    }
    Ok(())
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    if t.len() < 8 {
        return false;
    }
    SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}

/// JSON-pointer token escaping per RFC 6901.
fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}
