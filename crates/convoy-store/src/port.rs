//! The `FleetStore` trait and its error type.

use async_trait::async_trait;
use uuid::Uuid;

use convoy_domain::{
    Cargo, Driver, DriverStatus, Location, StatusHistoryEntry, Trailer, TrailerStatus,
    Transport, TransportStatus, User, Vehicle, VehicleStatus,
};

/// Statuses under which a transport holds its resources exclusively.
pub const ACTIVE_STATUSES: [TransportStatus; 3] = [
    TransportStatus::Planned,
    TransportStatus::Accepted,
    TransportStatus::InProgress,
];

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Failure surfaced by a store implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An exclusivity guard failed inside the atomic write. The message is
    /// the user-facing rule text.
    Conflict(String),
    /// A write targeted a row that does not exist.
    MissingRow { entity: &'static str, id: Uuid },
    /// Backend failure: connection, statement, transaction.
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict(msg) => f.write_str(msg),
            Self::MissingRow { entity, id } => write!(f, "{entity} row missing: {id}"),
            Self::Backend(msg) => write!(f, "store backend error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

// ---------------------------------------------------------------------------
// FleetStore
// ---------------------------------------------------------------------------

/// Persistence port for every entity the allocation engine touches.
///
/// Reads return `Ok(None)` for absent ids; the service decides whether that
/// is a NotFound. Each write method is one atomic unit: either all of its
/// effects commit or none do. Scans never mutate.
#[async_trait]
pub trait FleetStore: Send + Sync {
    // --- entity reads ------------------------------------------------------

    async fn transport(&self, id: Uuid) -> Result<Option<Transport>, StoreError>;
    async fn vehicle(&self, id: Uuid) -> Result<Option<Vehicle>, StoreError>;
    async fn trailer(&self, id: Uuid) -> Result<Option<Trailer>, StoreError>;
    async fn driver(&self, user_id: Uuid) -> Result<Option<Driver>, StoreError>;
    async fn location(&self, id: Uuid) -> Result<Option<Location>, StoreError>;
    async fn user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn cargo(&self, id: Uuid) -> Result<Option<Cargo>, StoreError>;

    // --- listings ----------------------------------------------------------

    async fn vehicles(&self) -> Result<Vec<Vehicle>, StoreError>;
    async fn trailers(&self) -> Result<Vec<Trailer>, StoreError>;
    async fn drivers(&self) -> Result<Vec<Driver>, StoreError>;
    /// Transports assigned to a driver, newest planned start first.
    async fn transports_for_driver(&self, driver_id: Uuid) -> Result<Vec<Transport>, StoreError>;
    async fn cargo_for_transport(&self, transport_id: Uuid) -> Result<Vec<Cargo>, StoreError>;
    /// History rows for one transport, newest first.
    async fn history_for_transport(
        &self,
        transport_id: Uuid,
    ) -> Result<Vec<StatusHistoryEntry>, StoreError>;

    // --- exclusivity scans -------------------------------------------------

    /// Does any transport with status in `statuses` reference this vehicle?
    /// `exclude` drops one transport from the scan (self-exclusion).
    async fn vehicle_on_transport_in(
        &self,
        vehicle_id: Uuid,
        statuses: &[TransportStatus],
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError>;
    async fn trailer_on_transport_in(
        &self,
        trailer_id: Uuid,
        statuses: &[TransportStatus],
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError>;
    async fn driver_on_transport_in(
        &self,
        driver_id: Uuid,
        statuses: &[TransportStatus],
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError>;
    /// Referenced by any transport at all, regardless of status.
    async fn vehicle_referenced(&self, vehicle_id: Uuid) -> Result<bool, StoreError>;
    async fn trailer_referenced(&self, trailer_id: Uuid) -> Result<bool, StoreError>;

    // --- transport writes (guarded) ----------------------------------------

    /// Insert a new transport together with its initial history row.
    /// Re-checks vehicle/trailer exclusivity atomically. Driver assignment
    /// has no store-level uniqueness; the lifecycle guard on IN_PROGRESS is
    /// the driver invariant.
    async fn insert_transport(
        &self,
        t: &Transport,
        first_entry: &StatusHistoryEntry,
    ) -> Result<(), StoreError>;
    /// Replace a transport row (no status change, no history). Re-checks
    /// exclusivity for the referenced resources, excluding the transport
    /// itself.
    async fn update_transport(&self, t: &Transport) -> Result<(), StoreError>;
    /// Persist a status transition together with its history row.
    /// Re-checks the one-IN_PROGRESS-per-driver rule when the new status is
    /// ACCEPTED or IN_PROGRESS.
    async fn commit_transition(
        &self,
        t: &Transport,
        entry: &StatusHistoryEntry,
    ) -> Result<(), StoreError>;
    /// Delete a transport and cascade its cargo and history rows.
    async fn delete_transport(&self, id: Uuid) -> Result<(), StoreError>;

    // --- cargo writes ------------------------------------------------------

    async fn insert_cargo(&self, c: &Cargo) -> Result<(), StoreError>;
    async fn update_cargo(&self, c: &Cargo) -> Result<(), StoreError>;
    async fn delete_cargo(&self, id: Uuid) -> Result<(), StoreError>;

    // --- resource writes ---------------------------------------------------

    async fn insert_vehicle(&self, v: &Vehicle) -> Result<(), StoreError>;
    async fn insert_trailer(&self, t: &Trailer) -> Result<(), StoreError>;
    async fn insert_driver(&self, d: &Driver) -> Result<(), StoreError>;
    async fn insert_location(&self, l: &Location) -> Result<(), StoreError>;
    async fn insert_user(&self, u: &User) -> Result<(), StoreError>;
    async fn update_vehicle_status(
        &self,
        id: Uuid,
        status: VehicleStatus,
    ) -> Result<(), StoreError>;
    async fn update_trailer_status(
        &self,
        id: Uuid,
        status: TrailerStatus,
    ) -> Result<(), StoreError>;
    async fn update_driver_status(
        &self,
        user_id: Uuid,
        status: DriverStatus,
    ) -> Result<(), StoreError>;
    async fn delete_vehicle(&self, id: Uuid) -> Result<(), StoreError>;
    async fn delete_trailer(&self, id: Uuid) -> Result<(), StoreError>;
}
