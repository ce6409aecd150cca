//! Resource operations outside the transport lifecycle: status guards,
//! delete guards and the available-for-allocation listings.
//!
//! Vehicles and trailers may not change their own status while a transport
//! in ACCEPTED or IN_PROGRESS holds them; a driver may not be set back to
//! AVAILABLE while any active transport names them. Deletion is stricter:
//! one referencing transport in any status pins the resource forever, since
//! history must stay resolvable.

use uuid::Uuid;

use convoy_domain::{
    Driver, DriverStatus, Trailer, TrailerStatus, TransportStatus, Vehicle, VehicleStatus,
};
use convoy_store::ACTIVE_STATUSES;

use crate::error::{not_found, rule};
use crate::{DispatchError, Dispatcher};

/// Statuses under which a held vehicle/trailer refuses own status changes.
const COMMITTED_STATUSES: [TransportStatus; 2] =
    [TransportStatus::Accepted, TransportStatus::InProgress];

impl Dispatcher {
    // --- status guards -----------------------------------------------------

    pub async fn set_vehicle_status(
        &self,
        vehicle_id: Uuid,
        status: VehicleStatus,
    ) -> Result<Vehicle, DispatchError> {
        let mut v = self
            .store
            .vehicle(vehicle_id)
            .await?
            .ok_or(not_found("Vehicle", vehicle_id))?;
        if self
            .store
            .vehicle_on_transport_in(vehicle_id, &COMMITTED_STATUSES, None)
            .await?
        {
            return Err(rule(
                "Vehicle is assigned to an active transport and status cannot be changed",
            ));
        }
        self.store.update_vehicle_status(vehicle_id, status).await?;
        v.status = status;
        Ok(v)
    }

    pub async fn set_trailer_status(
        &self,
        trailer_id: Uuid,
        status: TrailerStatus,
    ) -> Result<Trailer, DispatchError> {
        let mut t = self
            .store
            .trailer(trailer_id)
            .await?
            .ok_or(not_found("Trailer", trailer_id))?;
        if self
            .store
            .trailer_on_transport_in(trailer_id, &COMMITTED_STATUSES, None)
            .await?
        {
            return Err(rule(
                "Trailer is assigned to an active transport and status cannot be changed",
            ));
        }
        self.store.update_trailer_status(trailer_id, status).await?;
        t.status = status;
        Ok(t)
    }

    /// A driver can always step away (ON_TRANSPORT, UNAVAILABLE); only the
    /// return to AVAILABLE is guarded.
    pub async fn set_driver_status(
        &self,
        driver_id: Uuid,
        status: DriverStatus,
    ) -> Result<Driver, DispatchError> {
        let mut d = self
            .store
            .driver(driver_id)
            .await?
            .ok_or(not_found("Driver", driver_id))?;
        if status == DriverStatus::Available
            && self
                .store
                .driver_on_transport_in(driver_id, &ACTIVE_STATUSES, None)
                .await?
        {
            return Err(rule("Driver is assigned to active transport"));
        }
        self.store.update_driver_status(driver_id, status).await?;
        d.status = status;
        Ok(d)
    }

    // --- delete guards -----------------------------------------------------

    pub async fn remove_vehicle(&self, vehicle_id: Uuid) -> Result<(), DispatchError> {
        if self.store.vehicle(vehicle_id).await?.is_none() {
            return Err(not_found("Vehicle", vehicle_id));
        }
        if self.store.vehicle_referenced(vehicle_id).await? {
            return Err(rule("Vehicle is assigned to a transport and cannot be deleted"));
        }
        self.store.delete_vehicle(vehicle_id).await?;
        Ok(())
    }

    pub async fn remove_trailer(&self, trailer_id: Uuid) -> Result<(), DispatchError> {
        if self.store.trailer(trailer_id).await?.is_none() {
            return Err(not_found("Trailer", trailer_id));
        }
        if self.store.trailer_referenced(trailer_id).await? {
            return Err(rule("Trailer is assigned to a transport and cannot be deleted"));
        }
        self.store.delete_trailer(trailer_id).await?;
        Ok(())
    }

    // --- availability listings ---------------------------------------------

    pub async fn available_vehicles(&self) -> Result<Vec<Vehicle>, DispatchError> {
        Ok(convoy_registry::available_vehicles(self.store.as_ref()).await?)
    }

    pub async fn available_trailers(&self) -> Result<Vec<Trailer>, DispatchError> {
        Ok(convoy_registry::available_trailers(self.store.as_ref()).await?)
    }

    pub async fn available_drivers(&self) -> Result<Vec<Driver>, DispatchError> {
        Ok(convoy_registry::available_drivers(self.store.as_ref()).await?)
    }
}
