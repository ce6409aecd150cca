//! Availability decisions for vehicles, trailers and drivers.
//!
//! A resource can be claimed by a transport only when two independent
//! conditions hold: its own status is the allocatable one (`ACTIVE` for
//! vehicles and trailers, `AVAILABLE` for drivers), and no transport in
//! `PLANNED`, `ACCEPTED` or `IN_PROGRESS` already references it. The probes
//! here evaluate both and report which condition failed, so callers can
//! surface the precise refusal instead of a bare "no".

use uuid::Uuid;

use convoy_domain::{Driver, DriverStatus, Trailer, TrailerStatus, Vehicle, VehicleStatus};
use convoy_store::{FleetStore, StoreError, ACTIVE_STATUSES};

// ---------------------------------------------------------------------------
// Decision type
// ---------------------------------------------------------------------------

/// Outcome of one availability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    /// The resource's own status rules it out.
    InactiveStatus,
    /// A transport in PLANNED, ACCEPTED or IN_PROGRESS references it.
    OnActiveTransport,
}

impl Availability {
    pub fn is_available(self) -> bool {
        matches!(self, Availability::Available)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum RegistryError {
    /// The probed id does not exist.
    NotFound { entity: &'static str, id: Uuid },
    Store(StoreError),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<StoreError> for RegistryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::MissingRow { entity, id } => Self::NotFound { entity, id },
            other => Self::Store(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Probes
// ---------------------------------------------------------------------------

/// Availability of one vehicle.
///
/// `exclude` drops one transport from the reference scan so a transport
/// being edited does not collide with its own assignment.
pub async fn vehicle_availability(
    store: &dyn FleetStore,
    vehicle_id: Uuid,
    exclude: Option<Uuid>,
) -> Result<Availability, RegistryError> {
    let vehicle = store.vehicle(vehicle_id).await?.ok_or(RegistryError::NotFound {
        entity: "Vehicle",
        id: vehicle_id,
    })?;
    if vehicle.status != VehicleStatus::Active {
        return Ok(Availability::InactiveStatus);
    }
    if store
        .vehicle_on_transport_in(vehicle_id, &ACTIVE_STATUSES, exclude)
        .await?
    {
        return Ok(Availability::OnActiveTransport);
    }
    Ok(Availability::Available)
}

/// Availability of one trailer. Same shape as [`vehicle_availability`].
pub async fn trailer_availability(
    store: &dyn FleetStore,
    trailer_id: Uuid,
    exclude: Option<Uuid>,
) -> Result<Availability, RegistryError> {
    let trailer = store.trailer(trailer_id).await?.ok_or(RegistryError::NotFound {
        entity: "Trailer",
        id: trailer_id,
    })?;
    if trailer.status != TrailerStatus::Active {
        return Ok(Availability::InactiveStatus);
    }
    if store
        .trailer_on_transport_in(trailer_id, &ACTIVE_STATUSES, exclude)
        .await?
    {
        return Ok(Availability::OnActiveTransport);
    }
    Ok(Availability::Available)
}

/// Availability of one driver, keyed by user id.
pub async fn driver_availability(
    store: &dyn FleetStore,
    driver_id: Uuid,
    exclude: Option<Uuid>,
) -> Result<Availability, RegistryError> {
    let driver = store.driver(driver_id).await?.ok_or(RegistryError::NotFound {
        entity: "Driver",
        id: driver_id,
    })?;
    if driver.status != DriverStatus::Available {
        return Ok(Availability::InactiveStatus);
    }
    if store
        .driver_on_transport_in(driver_id, &ACTIVE_STATUSES, exclude)
        .await?
    {
        return Ok(Availability::OnActiveTransport);
    }
    Ok(Availability::Available)
}

/// True when the vehicle exists, is ACTIVE and sits on no active transport.
pub async fn is_vehicle_available(
    store: &dyn FleetStore,
    vehicle_id: Uuid,
    exclude: Option<Uuid>,
) -> Result<bool, RegistryError> {
    Ok(vehicle_availability(store, vehicle_id, exclude)
        .await?
        .is_available())
}

pub async fn is_trailer_available(
    store: &dyn FleetStore,
    trailer_id: Uuid,
    exclude: Option<Uuid>,
) -> Result<bool, RegistryError> {
    Ok(trailer_availability(store, trailer_id, exclude)
        .await?
        .is_available())
}

pub async fn is_driver_available(
    store: &dyn FleetStore,
    driver_id: Uuid,
    exclude: Option<Uuid>,
) -> Result<bool, RegistryError> {
    Ok(driver_availability(store, driver_id, exclude)
        .await?
        .is_available())
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// Every vehicle that would pass [`vehicle_availability`] right now.
pub async fn available_vehicles(store: &dyn FleetStore) -> Result<Vec<Vehicle>, RegistryError> {
    let mut out = Vec::new();
    for v in store.vehicles().await? {
        if v.status != VehicleStatus::Active {
            continue;
        }
        if store
            .vehicle_on_transport_in(v.id, &ACTIVE_STATUSES, None)
            .await?
        {
            continue;
        }
        out.push(v);
    }
    Ok(out)
}

pub async fn available_trailers(store: &dyn FleetStore) -> Result<Vec<Trailer>, RegistryError> {
    let mut out = Vec::new();
    for t in store.trailers().await? {
        if t.status != TrailerStatus::Active {
            continue;
        }
        if store
            .trailer_on_transport_in(t.id, &ACTIVE_STATUSES, None)
            .await?
        {
            continue;
        }
        out.push(t);
    }
    Ok(out)
}

pub async fn available_drivers(store: &dyn FleetStore) -> Result<Vec<Driver>, RegistryError> {
    let mut out = Vec::new();
    for d in store.drivers().await? {
        if d.status != DriverStatus::Available {
            continue;
        }
        if store
            .driver_on_transport_in(d.user_id, &ACTIVE_STATUSES, None)
            .await?
        {
            continue;
        }
        out.push(d);
    }
    Ok(out)
}
