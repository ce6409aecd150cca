//! Shared runtime state for convoy-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. The state is built
//! once at startup around whichever `FleetStore` the config selected;
//! scenario tests seed an in-memory store and build it directly.

use std::sync::Arc;

use convoy_config::StoreBackend;
use convoy_db::PgStore;
use convoy_dispatch::Dispatcher;
use convoy_store::MemStore;
use serde::Serialize;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

/// Static build metadata included in the health response.
#[derive(Clone, Debug, Serialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

impl BuildInfo {
    fn current() -> Self {
        Self {
            service: "convoy-daemon",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Shared handle behind every handler.
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub build: BuildInfo,
    /// Which store the daemon runs on, surfaced by GET /api/status.
    pub store_backend: StoreBackend,
    /// Hash of the merged config the daemon booted with.
    pub config_hash: String,
    /// Present only in postgres mode; the status route probes it.
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// State over an in-memory store. The daemon uses this in `memory`
    /// mode; scenario tests seed the store first and pass it here.
    pub fn in_memory(store: Arc<MemStore>, config_hash: impl Into<String>) -> Self {
        Self {
            dispatcher: Dispatcher::new(store),
            build: BuildInfo::current(),
            store_backend: StoreBackend::Memory,
            config_hash: config_hash.into(),
            db_pool: None,
        }
    }

    /// State over Postgres. The pool stays on hand for status probes.
    pub fn postgres(pool: PgPool, config_hash: impl Into<String>) -> Self {
        Self {
            dispatcher: Dispatcher::new(Arc::new(PgStore::new(pool.clone()))),
            build: BuildInfo::current(),
            store_backend: StoreBackend::Postgres,
            config_hash: config_hash.into(),
            db_pool: Some(pool),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Monotonically increasing uptime since first call (process lifetime).
pub fn uptime_secs() -> u64 {
    static START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    START
        .get_or_init(std::time::Instant::now)
        .elapsed()
        .as_secs()
}
