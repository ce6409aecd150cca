//! Request and response envelopes for the convoy-daemon HTTP surface.
//!
//! Entities serialize straight from `convoy-domain`; only the daemon-side
//! wrappers live here. No business logic in this module.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use convoy_domain::{CreateTransportRequest, TransportStatus};

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// GET /api/status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub daemon_uptime_secs: u64,
    /// "memory" | "postgres"
    pub store: &'static str,
    pub config_hash: String,
    /// Present only in postgres mode.
    pub db: Option<DbHealth>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DbHealth {
    pub ok: bool,
    pub has_transports_table: bool,
}

// ---------------------------------------------------------------------------
// Error envelope
// ---------------------------------------------------------------------------

/// Body of every non-2xx response: the error kind plus the rule text.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// "NOT_FOUND" | "BUSINESS_RULE" | "VALIDATION" | "BACKEND"
    pub error: &'static str,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// POST /api/transports. Authentication is out of scope, so the acting
/// staff user rides in the body next to the flattened create request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransportBody {
    pub acting_user_id: Uuid,
    #[serde(flatten)]
    pub transport: CreateTransportRequest,
}

/// POST /api/transports/:id/assign-driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignDriverBody {
    pub driver_id: Uuid,
}

/// Which transition table a status change runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorKind {
    Admin,
    Driver,
}

/// POST /api/transports/:id/status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeStatusBody {
    pub status: TransportStatus,
    pub actor: ActorKind,
    /// Admin: the staff user id. Driver: the driver's user id.
    pub user_id: Uuid,
}

/// POST /api/{vehicles,trailers,drivers}/:id/status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusBody<T> {
    pub status: T,
}
