//! In-memory `FleetStore`.
//!
//! One async mutex serializes every operation, so each trait method is a
//! single atomic unit against the dataset. That is the same guarantee the
//! Postgres store gets from its transactions, which keeps the guard
//! behavior identical across backends.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use convoy_domain::{
    Cargo, Driver, DriverStatus, Location, StatusHistoryEntry, Trailer, TrailerStatus,
    Transport, TransportStatus, User, Vehicle, VehicleStatus,
};

use crate::port::{FleetStore, StoreError, ACTIVE_STATUSES};

#[derive(Default)]
struct Inner {
    transports: HashMap<Uuid, Transport>,
    cargo: HashMap<Uuid, Cargo>,
    history: Vec<StatusHistoryEntry>,
    vehicles: HashMap<Uuid, Vehicle>,
    trailers: HashMap<Uuid, Trailer>,
    drivers: HashMap<Uuid, Driver>,
    locations: HashMap<Uuid, Location>,
    users: HashMap<Uuid, User>,
}

impl Inner {
    fn vehicle_scan(
        &self,
        vehicle_id: Uuid,
        statuses: &[TransportStatus],
        exclude: Option<Uuid>,
    ) -> bool {
        self.transports.values().any(|t| {
            t.vehicle_id == vehicle_id && statuses.contains(&t.status) && Some(t.id) != exclude
        })
    }

    fn trailer_scan(
        &self,
        trailer_id: Uuid,
        statuses: &[TransportStatus],
        exclude: Option<Uuid>,
    ) -> bool {
        self.transports.values().any(|t| {
            t.trailer_id == Some(trailer_id)
                && statuses.contains(&t.status)
                && Some(t.id) != exclude
        })
    }

    fn driver_scan(
        &self,
        driver_id: Uuid,
        statuses: &[TransportStatus],
        exclude: Option<Uuid>,
    ) -> bool {
        self.transports.values().any(|t| {
            t.driver_id == Some(driver_id)
                && statuses.contains(&t.status)
                && Some(t.id) != exclude
        })
    }

    /// Vehicle/trailer double-booking backstop for transport writes.
    /// `exclude` is the transport being written (None on insert).
    fn check_resource_guards(&self, t: &Transport, exclude: Option<Uuid>) -> Result<(), StoreError> {
        if !t.status.is_active() {
            return Ok(());
        }
        if self.vehicle_scan(t.vehicle_id, &ACTIVE_STATUSES, exclude) {
            return Err(StoreError::Conflict(
                "Vehicle is already assigned to an active transport".to_string(),
            ));
        }
        if let Some(trailer_id) = t.trailer_id {
            if self.trailer_scan(trailer_id, &ACTIVE_STATUSES, exclude) {
                return Err(StoreError::Conflict(
                    "Trailer is already assigned to an active transport".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Serialized in-memory store. Cheap to clone handles: wrap in `Arc`.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FleetStore for MemStore {
    // --- entity reads ------------------------------------------------------

    async fn transport(&self, id: Uuid) -> Result<Option<Transport>, StoreError> {
        Ok(self.inner.lock().await.transports.get(&id).cloned())
    }

    async fn vehicle(&self, id: Uuid) -> Result<Option<Vehicle>, StoreError> {
        Ok(self.inner.lock().await.vehicles.get(&id).cloned())
    }

    async fn trailer(&self, id: Uuid) -> Result<Option<Trailer>, StoreError> {
        Ok(self.inner.lock().await.trailers.get(&id).cloned())
    }

    async fn driver(&self, user_id: Uuid) -> Result<Option<Driver>, StoreError> {
        Ok(self.inner.lock().await.drivers.get(&user_id).cloned())
    }

    async fn location(&self, id: Uuid) -> Result<Option<Location>, StoreError> {
        Ok(self.inner.lock().await.locations.get(&id).cloned())
    }

    async fn user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.inner.lock().await.users.get(&id).cloned())
    }

    async fn cargo(&self, id: Uuid) -> Result<Option<Cargo>, StoreError> {
        Ok(self.inner.lock().await.cargo.get(&id).cloned())
    }

    // --- listings ----------------------------------------------------------

    async fn vehicles(&self) -> Result<Vec<Vehicle>, StoreError> {
        let inner = self.inner.lock().await;
        let mut out: Vec<Vehicle> = inner.vehicles.values().cloned().collect();
        out.sort_by(|a, b| a.license_plate.cmp(&b.license_plate));
        Ok(out)
    }

    async fn trailers(&self) -> Result<Vec<Trailer>, StoreError> {
        let inner = self.inner.lock().await;
        let mut out: Vec<Trailer> = inner.trailers.values().cloned().collect();
        out.sort_by(|a, b| a.license_plate.cmp(&b.license_plate));
        Ok(out)
    }

    async fn drivers(&self) -> Result<Vec<Driver>, StoreError> {
        let inner = self.inner.lock().await;
        let mut out: Vec<Driver> = inner.drivers.values().cloned().collect();
        out.sort_by(|a, b| a.license_number.cmp(&b.license_number));
        Ok(out)
    }

    async fn transports_for_driver(&self, driver_id: Uuid) -> Result<Vec<Transport>, StoreError> {
        let inner = self.inner.lock().await;
        let mut out: Vec<Transport> = inner
            .transports
            .values()
            .filter(|t| t.driver_id == Some(driver_id))
            .cloned()
            .collect();
        // Newest planned start first; transports without one go last.
        out.sort_by(|a, b| b.planned_start_at.cmp(&a.planned_start_at));
        Ok(out)
    }

    async fn cargo_for_transport(&self, transport_id: Uuid) -> Result<Vec<Cargo>, StoreError> {
        let inner = self.inner.lock().await;
        let mut out: Vec<Cargo> = inner
            .cargo
            .values()
            .filter(|c| c.transport_id == transport_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }

    async fn history_for_transport(
        &self,
        transport_id: Uuid,
    ) -> Result<Vec<StatusHistoryEntry>, StoreError> {
        let inner = self.inner.lock().await;
        let mut out: Vec<StatusHistoryEntry> = inner
            .history
            .iter()
            .filter(|h| h.transport_id == transport_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));
        Ok(out)
    }

    // --- exclusivity scans -------------------------------------------------

    async fn vehicle_on_transport_in(
        &self,
        vehicle_id: Uuid,
        statuses: &[TransportStatus],
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        Ok(self
            .inner
            .lock()
            .await
            .vehicle_scan(vehicle_id, statuses, exclude))
    }

    async fn trailer_on_transport_in(
        &self,
        trailer_id: Uuid,
        statuses: &[TransportStatus],
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        Ok(self
            .inner
            .lock()
            .await
            .trailer_scan(trailer_id, statuses, exclude))
    }

    async fn driver_on_transport_in(
        &self,
        driver_id: Uuid,
        statuses: &[TransportStatus],
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        Ok(self
            .inner
            .lock()
            .await
            .driver_scan(driver_id, statuses, exclude))
    }

    async fn vehicle_referenced(&self, vehicle_id: Uuid) -> Result<bool, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.transports.values().any(|t| t.vehicle_id == vehicle_id))
    }

    async fn trailer_referenced(&self, trailer_id: Uuid) -> Result<bool, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .transports
            .values()
            .any(|t| t.trailer_id == Some(trailer_id)))
    }

    // --- transport writes --------------------------------------------------

    async fn insert_transport(
        &self,
        t: &Transport,
        first_entry: &StatusHistoryEntry,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.check_resource_guards(t, None)?;
        inner.transports.insert(t.id, t.clone());
        inner.history.push(first_entry.clone());
        Ok(())
    }

    async fn update_transport(&self, t: &Transport) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.transports.contains_key(&t.id) {
            return Err(StoreError::MissingRow {
                entity: "transport",
                id: t.id,
            });
        }
        inner.check_resource_guards(t, Some(t.id))?;
        inner.transports.insert(t.id, t.clone());
        Ok(())
    }

    async fn commit_transition(
        &self,
        t: &Transport,
        entry: &StatusHistoryEntry,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.transports.contains_key(&t.id) {
            return Err(StoreError::MissingRow {
                entity: "transport",
                id: t.id,
            });
        }
        // One driver, one IN_PROGRESS transport: re-checked here under the
        // same lock that performs the write.
        if matches!(
            t.status,
            TransportStatus::Accepted | TransportStatus::InProgress
        ) {
            if let Some(driver_id) = t.driver_id {
                if inner.driver_scan(driver_id, &[TransportStatus::InProgress], Some(t.id)) {
                    return Err(StoreError::Conflict(
                        "Driver already has a transport in progress".to_string(),
                    ));
                }
            }
        }
        inner.transports.insert(t.id, t.clone());
        inner.history.push(entry.clone());
        Ok(())
    }

    async fn delete_transport(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.transports.remove(&id).is_none() {
            return Err(StoreError::MissingRow {
                entity: "transport",
                id,
            });
        }
        inner.cargo.retain(|_, c| c.transport_id != id);
        inner.history.retain(|h| h.transport_id != id);
        Ok(())
    }

    // --- cargo writes ------------------------------------------------------

    async fn insert_cargo(&self, c: &Cargo) -> Result<(), StoreError> {
        self.inner.lock().await.cargo.insert(c.id, c.clone());
        Ok(())
    }

    async fn update_cargo(&self, c: &Cargo) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.cargo.contains_key(&c.id) {
            return Err(StoreError::MissingRow {
                entity: "cargo",
                id: c.id,
            });
        }
        inner.cargo.insert(c.id, c.clone());
        Ok(())
    }

    async fn delete_cargo(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.cargo.remove(&id).is_none() {
            return Err(StoreError::MissingRow { entity: "cargo", id });
        }
        Ok(())
    }

    // --- resource writes ---------------------------------------------------

    async fn insert_vehicle(&self, v: &Vehicle) -> Result<(), StoreError> {
        self.inner.lock().await.vehicles.insert(v.id, v.clone());
        Ok(())
    }

    async fn insert_trailer(&self, t: &Trailer) -> Result<(), StoreError> {
        self.inner.lock().await.trailers.insert(t.id, t.clone());
        Ok(())
    }

    async fn insert_driver(&self, d: &Driver) -> Result<(), StoreError> {
        self.inner.lock().await.drivers.insert(d.user_id, d.clone());
        Ok(())
    }

    async fn insert_location(&self, l: &Location) -> Result<(), StoreError> {
        self.inner.lock().await.locations.insert(l.id, l.clone());
        Ok(())
    }

    async fn insert_user(&self, u: &User) -> Result<(), StoreError> {
        self.inner.lock().await.users.insert(u.id, u.clone());
        Ok(())
    }

    async fn update_vehicle_status(
        &self,
        id: Uuid,
        status: VehicleStatus,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.vehicles.get_mut(&id) {
            Some(v) => {
                v.status = status;
                Ok(())
            }
            None => Err(StoreError::MissingRow {
                entity: "vehicle",
                id,
            }),
        }
    }

    async fn update_trailer_status(
        &self,
        id: Uuid,
        status: TrailerStatus,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.trailers.get_mut(&id) {
            Some(t) => {
                t.status = status;
                Ok(())
            }
            None => Err(StoreError::MissingRow {
                entity: "trailer",
                id,
            }),
        }
    }

    async fn update_driver_status(
        &self,
        user_id: Uuid,
        status: DriverStatus,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.drivers.get_mut(&user_id) {
            Some(d) => {
                d.status = status;
                Ok(())
            }
            None => Err(StoreError::MissingRow {
                entity: "driver",
                id: user_id,
            }),
        }
    }

    async fn delete_vehicle(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.vehicles.remove(&id).is_none() {
            return Err(StoreError::MissingRow {
                entity: "vehicle",
                id,
            });
        }
        Ok(())
    }

    async fn delete_trailer(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.trailers.remove(&id).is_none() {
            return Err(StoreError::MissingRow {
                entity: "trailer",
                id,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn uid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn transport(id: u128, vehicle: u128, driver: Option<u128>) -> Transport {
        Transport {
            id: uid(id),
            status: TransportStatus::Planned,
            contractual_due_at: None,
            planned_start_at: None,
            planned_end_at: None,
            actual_start_at: None,
            actual_end_at: None,
            planned_distance_m: None,
            actual_distance_m: None,
            vehicle_id: uid(vehicle),
            trailer_id: None,
            driver_id: driver.map(uid),
            pickup_location_id: uid(100),
            delivery_location_id: uid(101),
            created_by: uid(102),
        }
    }

    fn entry(transport: u128, status: TransportStatus, minute: u32) -> StatusHistoryEntry {
        StatusHistoryEntry {
            id: Uuid::new_v4(),
            transport_id: uid(transport),
            status,
            changed_by: None,
            changed_at: Utc.with_ymd_and_hms(2025, 6, 1, 10, minute, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn insert_guard_blocks_vehicle_double_booking() {
        let store = MemStore::new();
        let a = transport(1, 50, None);
        store
            .insert_transport(&a, &entry(1, TransportStatus::Planned, 0))
            .await
            .unwrap();

        let b = transport(2, 50, None);
        let err = store
            .insert_transport(&b, &entry(2, TransportStatus::Planned, 1))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::Conflict("Vehicle is already assigned to an active transport".to_string())
        );
        assert!(store.transport(uid(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_excludes_the_transport_itself() {
        let store = MemStore::new();
        let mut a = transport(1, 50, None);
        store
            .insert_transport(&a, &entry(1, TransportStatus::Planned, 0))
            .await
            .unwrap();

        // Keeping its own vehicle must not conflict with itself.
        a.planned_distance_m = Some(120_000);
        store.update_transport(&a).await.unwrap();

        let stored = store.transport(uid(1)).await.unwrap().unwrap();
        assert_eq!(stored.planned_distance_m, Some(120_000));
    }

    #[tokio::test]
    async fn terminal_transport_frees_its_vehicle() {
        let store = MemStore::new();
        let mut a = transport(1, 50, None);
        store
            .insert_transport(&a, &entry(1, TransportStatus::Planned, 0))
            .await
            .unwrap();
        a.status = TransportStatus::Cancelled;
        store
            .commit_transition(&a, &entry(1, TransportStatus::Cancelled, 1))
            .await
            .unwrap();

        // Vehicle 50 is free again for a new transport.
        let b = transport(2, 50, None);
        store
            .insert_transport(&b, &entry(2, TransportStatus::Planned, 2))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn commit_guard_enforces_single_in_progress_per_driver() {
        let store = MemStore::new();
        let mut a = transport(1, 50, Some(9));
        store
            .insert_transport(&a, &entry(1, TransportStatus::Planned, 0))
            .await
            .unwrap();
        a.status = TransportStatus::InProgress;
        store
            .commit_transition(&a, &entry(1, TransportStatus::InProgress, 1))
            .await
            .unwrap();

        // Second transport for the same driver, different vehicle.
        let mut b = transport(2, 51, Some(9));
        store
            .insert_transport(&b, &entry(2, TransportStatus::Planned, 2))
            .await
            .unwrap();
        b.status = TransportStatus::Accepted;
        let err = store
            .commit_transition(&b, &entry(2, TransportStatus::Accepted, 3))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::Conflict("Driver already has a transport in progress".to_string())
        );
        // Nothing committed: status and history untouched.
        let stored = store.transport(uid(2)).await.unwrap().unwrap();
        assert_eq!(stored.status, TransportStatus::Planned);
        assert_eq!(store.history_for_transport(uid(2)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_cascades_cargo_and_history() {
        let store = MemStore::new();
        let a = transport(1, 50, None);
        store
            .insert_transport(&a, &entry(1, TransportStatus::Planned, 0))
            .await
            .unwrap();
        store
            .insert_cargo(&Cargo {
                id: uid(70),
                transport_id: uid(1),
                description: "crates".to_string(),
                weight_g: 1_000,
                volume_l: 10,
                pickup_date: None,
                delivery_date: None,
            })
            .await
            .unwrap();

        store.delete_transport(uid(1)).await.unwrap();
        assert!(store.cargo(uid(70)).await.unwrap().is_none());
        assert!(store
            .history_for_transport(uid(1))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn history_comes_back_newest_first() {
        let store = MemStore::new();
        let mut a = transport(1, 50, Some(9));
        store
            .insert_transport(&a, &entry(1, TransportStatus::Planned, 0))
            .await
            .unwrap();
        a.status = TransportStatus::Accepted;
        store
            .commit_transition(&a, &entry(1, TransportStatus::Accepted, 5))
            .await
            .unwrap();

        let rows = store.history_for_transport(uid(1)).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].status, TransportStatus::Accepted);
        assert_eq!(rows[1].status, TransportStatus::Planned);
    }

    #[tokio::test]
    async fn scans_honour_status_subsets_and_exclusion() {
        let store = MemStore::new();
        let a = transport(1, 50, Some(9));
        store
            .insert_transport(&a, &entry(1, TransportStatus::Planned, 0))
            .await
            .unwrap();

        assert!(store
            .vehicle_on_transport_in(uid(50), &ACTIVE_STATUSES, None)
            .await
            .unwrap());
        assert!(!store
            .vehicle_on_transport_in(uid(50), &ACTIVE_STATUSES, Some(uid(1)))
            .await
            .unwrap());
        assert!(!store
            .vehicle_on_transport_in(uid(50), &[TransportStatus::InProgress], None)
            .await
            .unwrap());
        assert!(store.vehicle_referenced(uid(50)).await.unwrap());
        assert!(!store.vehicle_referenced(uid(51)).await.unwrap());
    }
}
