//! Transport state machine.
//!
//! # Design
//!
//! A transport moves through its lifecycle via [`apply_transition`], which
//! enforces two independent transition tables selected by the acting party:
//!
//! 1. **Driver table.** Strictly linear, one step at a time, and only on a
//!    transport assigned to that driver. A driver can never set a terminal
//!    state other than FINISHED.
//! 2. **Admin table.** From any non-terminal state to any state except the
//!    driver-only intermediates ACCEPTED and IN_PROGRESS, and never out of a
//!    terminal state. Dispatchers follow the admin table.
//!
//! Both tables are also exposed as the pure predicates [`driver_may`] and
//! [`admin_may`] so legality stays testable without building a transport.
//!
//! # State diagram
//!
//! ```text
//!              driver                driver                 driver
//!   PLANNED ──────────► ACCEPTED ──────────► IN_PROGRESS ──────────► FINISHED (term.)
//!      │                                          │
//!      │ admin                                    │ admin
//!      ▼                                          ▼
//!   CANCELLED / FAILED / REJECTED (term.)   CANCELLED / FAILED / REJECTED (term.)
//! ```
//!
//! Timestamp side effects fire once per field: `actual_start_at` on first
//! entry into IN_PROGRESS, `actual_end_at` on first entry into any terminal
//! state. Terminal states have no outgoing edges, so "once" is guaranteed by
//! the tables themselves.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use convoy_domain::{Transport, TransportStatus};

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// Capability tag of the party requesting a transition.
///
/// Admin covers dispatchers as well; the two roles share one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Admin { user_id: Uuid },
    Driver { driver_id: Uuid },
}

impl Actor {
    /// The acting user recorded in status history. A driver id is a user id.
    pub fn user_id(&self) -> Uuid {
        match self {
            Self::Admin { user_id } => *user_id,
            Self::Driver { driver_id } => *driver_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Transition tables
// ---------------------------------------------------------------------------

/// Driver legality: PLANNED→ACCEPTED→IN_PROGRESS→FINISHED, one step.
pub fn driver_may(from: TransportStatus, to: TransportStatus) -> bool {
    use TransportStatus::*;
    matches!(
        (from, to),
        (Planned, Accepted) | (Accepted, InProgress) | (InProgress, Finished)
    )
}

/// Admin legality: any non-terminal source, any target except the
/// driver-only intermediates.
pub fn admin_may(from: TransportStatus, to: TransportStatus) -> bool {
    use TransportStatus::*;
    !from.is_terminal() && !matches!(to, Accepted | InProgress)
}

// ---------------------------------------------------------------------------
// TransitionError
// ---------------------------------------------------------------------------

/// Why a requested transition was refused. Display strings are the
/// user-facing rule messages and must stay stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Driver path on a transport not assigned to that driver.
    NotAssignedToDriver,
    /// Driver requested CANCELLED, FAILED or REJECTED.
    DriverForbiddenStatus(TransportStatus),
    /// Driver requested something other than the single legal next step.
    DriverIllegalStep { from: TransportStatus },
    /// Driver already has a transport in IN_PROGRESS.
    DriverBusy,
    /// Admin attempted to leave a terminal state.
    AdminFromTerminal { from: TransportStatus },
    /// Admin requested a driver-only intermediate state.
    AdminDriverOnly { requested: TransportStatus },
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAssignedToDriver => f.write_str("Transport not assigned to this driver"),
            Self::DriverForbiddenStatus(s) => write!(f, "Driver cannot set status {s}"),
            Self::DriverIllegalStep { from } => match from {
                TransportStatus::Planned => f.write_str("PLANNED -> ACCEPTED only"),
                TransportStatus::Accepted => f.write_str("ACCEPTED -> IN_PROGRESS only"),
                TransportStatus::InProgress => f.write_str("IN_PROGRESS -> FINISHED only"),
                other => write!(f, "Transport in {other} cannot change status"),
            },
            Self::DriverBusy => f.write_str("Driver already has a transport in progress"),
            Self::AdminFromTerminal { from } => {
                write!(f, "Cannot change status from final state: {from}")
            }
            Self::AdminDriverOnly { requested } => {
                write!(f, "Admin cannot set intermediate driver-only status: {requested}")
            }
        }
    }
}

impl std::error::Error for TransitionError {}

// ---------------------------------------------------------------------------
// Transition application
// ---------------------------------------------------------------------------

/// Facts the caller must establish before applying a transition.
#[derive(Debug, Clone, Copy)]
pub struct TransitionCtx {
    pub actor: Actor,
    /// Instant stamped into timestamps; the caller reuses it for the
    /// history row so one transition carries one time.
    pub now: DateTime<Utc>,
    /// True when the transport's driver holds another IN_PROGRESS transport.
    /// Ignored on the admin table.
    pub driver_busy_elsewhere: bool,
}

/// Apply `requested` to the transport under the actor's table.
///
/// On success the transport's status is updated and the first-entry
/// timestamp side effects are applied. On error the transport is untouched.
/// The caller persists the mutation and appends the history row; this
/// function performs no IO.
pub fn apply_transition(
    t: &mut Transport,
    requested: TransportStatus,
    ctx: &TransitionCtx,
) -> Result<(), TransitionError> {
    match ctx.actor {
        Actor::Driver { driver_id } => {
            // 1) Ownership: the transport must be assigned to this driver.
            if t.driver_id != Some(driver_id) {
                return Err(TransitionError::NotAssignedToDriver);
            }
            // 2) Drivers never set CANCELLED / FAILED / REJECTED.
            if matches!(
                requested,
                TransportStatus::Cancelled | TransportStatus::Failed | TransportStatus::Rejected
            ) {
                return Err(TransitionError::DriverForbiddenStatus(requested));
            }
            // 3) Single legal step from the current state.
            if !driver_may(t.status, requested) {
                return Err(TransitionError::DriverIllegalStep { from: t.status });
            }
            // 4) One driver, at most one IN_PROGRESS transport, globally.
            //    Checked entering ACCEPTED and entering IN_PROGRESS.
            if matches!(
                requested,
                TransportStatus::Accepted | TransportStatus::InProgress
            ) && ctx.driver_busy_elsewhere
            {
                return Err(TransitionError::DriverBusy);
            }
        }
        Actor::Admin { .. } => {
            if t.status.is_terminal() {
                return Err(TransitionError::AdminFromTerminal { from: t.status });
            }
            if matches!(
                requested,
                TransportStatus::Accepted | TransportStatus::InProgress
            ) {
                return Err(TransitionError::AdminDriverOnly { requested });
            }
            debug_assert!(admin_may(t.status, requested));
        }
    }

    t.status = requested;

    if requested == TransportStatus::InProgress && t.actual_start_at.is_none() {
        t.actual_start_at = Some(ctx.now);
    }
    if requested.is_terminal() && t.actual_end_at.is_none() {
        t.actual_end_at = Some(ctx.now);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
