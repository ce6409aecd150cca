//! Storage port for the fleet engine, plus the in-memory implementation.
//!
//! The allocation service talks to [`FleetStore`] only; Postgres and the
//! in-memory store implement the same trait. Write primitives that carry a
//! correctness rule (transport insert/update, status commit) re-run the
//! exclusivity scan inside their own atomic section, so a conflict that
//! slips past the service's pre-check still cannot reach the data.

pub mod mem;
pub mod port;

pub use mem::MemStore;
pub use port::{FleetStore, StoreError, ACTIVE_STATUSES};
