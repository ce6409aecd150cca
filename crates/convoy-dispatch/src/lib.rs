//! Allocation service for the transport lifecycle engine.
//!
//! One [`Dispatcher`] owns a handle to the store port and exposes every
//! operation the system supports: transport CRUD, driver assignment, the two
//! status-change paths, cargo mutation under capacity rules, and the
//! resource guard operations. Each method is one unit of work; the store
//! commits its mutation and history append atomically, so a failed rule
//! check never leaves a half-written transport behind.
//!
//! Pure decisions live in `convoy-lifecycle`, `convoy-capacity` and
//! `convoy-registry`; this crate sequences them against live data and folds
//! their refusals into the [`DispatchError`] taxonomy.

use std::sync::Arc;

use convoy_store::FleetStore;

mod cargo;
mod error;
mod resource;
mod transport;

pub use error::DispatchError;

/// The allocation service. Cheap to clone; share one per process.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn FleetStore>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }
}
