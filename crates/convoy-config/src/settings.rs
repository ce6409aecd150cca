//! Typed daemon settings, extracted from the `/daemon` subtree of the
//! merged config.
//!
//! The environment wins over the files: `CONVOY_LISTEN_ADDR` and
//! `CONVOY_STORE` override their config counterparts when set and
//! non-blank. The daemon applies overrides once at startup; nothing else
//! reads these variables.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;

pub const ENV_LISTEN_ADDR: &str = "CONVOY_LISTEN_ADDR";
pub const ENV_STORE_BACKEND: &str = "CONVOY_STORE";

/// Which `FleetStore` implementation the daemon runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Postgres => "postgres",
        }
    }

    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" => Ok(Self::Postgres),
            other => bail!(
                "CONFIG_UNKNOWN_STORE: unrecognised store backend '{other}'; \
                 expected one of: memory | postgres"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DaemonSettings {
    /// Socket address the HTTP listener binds.
    pub listen_addr: String,
    pub store: StoreBackend,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            store: StoreBackend::Memory,
        }
    }
}

impl DaemonSettings {
    /// Read the `/daemon` subtree of a merged config. An absent subtree
    /// yields the defaults; a malformed one is an error, not a fallback.
    pub fn from_config_json(config: &Value) -> Result<Self> {
        match config.pointer("/daemon") {
            Some(sub) => serde_json::from_value(sub.clone())
                .context("invalid /daemon config section"),
            None => Ok(Self::default()),
        }
    }

    /// Apply environment overrides on top of the file values.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(addr) = env_nonblank(ENV_LISTEN_ADDR) {
            self.listen_addr = addr;
        }
        if let Some(raw) = env_nonblank(ENV_STORE_BACKEND) {
            self.store = StoreBackend::parse(&raw)?;
        }
        Ok(())
    }
}

/// A set-but-blank variable counts as unset.
fn env_nonblank(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}
