//! Transport operations: create, update, assignment, deletion, the two
//! status-change paths and the read surface.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use convoy_domain::{
    CreateTransportRequest, StatusHistoryEntry, Transport, TransportStatus,
};
use convoy_lifecycle::{apply_transition, Actor, TransitionCtx};
use convoy_registry::{
    driver_availability, trailer_availability, vehicle_availability, Availability,
};

use crate::error::{invalid, not_found, rule};
use crate::{DispatchError, Dispatcher};

impl Dispatcher {
    // --- create / update / delete ------------------------------------------

    /// Create a PLANNED transport and append its initial history row.
    ///
    /// Check order: planned dates, acting user, required vehicle ref,
    /// availability of every referenced resource, then location resolution.
    pub async fn create_transport(
        &self,
        req: &CreateTransportRequest,
        acting_user: Uuid,
    ) -> Result<Transport, DispatchError> {
        validate_planned_dates(req)?;

        let user = self
            .store
            .user(acting_user)
            .await?
            .ok_or(not_found("User id", acting_user))?;

        let vehicle_id = req
            .vehicle_id
            .ok_or_else(|| invalid("vehicleId is required"))?;

        self.ensure_vehicle_available(vehicle_id, None).await?;
        if let Some(trailer_id) = req.trailer_id {
            self.ensure_trailer_available(trailer_id, None).await?;
        }
        if let Some(driver_id) = req.driver_id {
            self.ensure_driver_available(driver_id, None).await?;
        }

        let (pickup_id, delivery_id) = self.resolve_locations(req).await?;

        let now = Utc::now();
        let transport = Transport {
            id: Uuid::new_v4(),
            status: TransportStatus::Planned,
            contractual_due_at: req.contractual_due_at,
            planned_start_at: req.planned_start_at,
            planned_end_at: req.planned_end_at,
            actual_start_at: None,
            actual_end_at: None,
            planned_distance_m: req.planned_distance_m,
            actual_distance_m: None,
            vehicle_id,
            trailer_id: req.trailer_id,
            driver_id: req.driver_id,
            pickup_location_id: pickup_id,
            delivery_location_id: delivery_id,
            created_by: user.id,
        };
        let entry = history_entry(transport.id, TransportStatus::Planned, Some(user.id), now);
        self.store.insert_transport(&transport, &entry).await?;

        tracing::debug!(transport = %transport.id, "transport created");
        Ok(transport)
    }

    /// Edit a PLANNED transport. Scalar fields merge (absent keeps stored);
    /// vehicle/trailer availability is re-checked only when the reference
    /// changes; an absent trailer ref clears the trailer. The driver ref is
    /// never touched here, only [`Dispatcher::assign_driver`] changes it.
    pub async fn update_transport(
        &self,
        id: Uuid,
        req: &CreateTransportRequest,
    ) -> Result<Transport, DispatchError> {
        let mut t = self.require_transport(id).await?;
        if t.status != TransportStatus::Planned {
            return Err(rule("Only PLANNED transports can be edited"));
        }
        validate_planned_dates(req)?;

        if req.contractual_due_at.is_some() {
            t.contractual_due_at = req.contractual_due_at;
        }
        if req.planned_start_at.is_some() {
            t.planned_start_at = req.planned_start_at;
        }
        if req.planned_end_at.is_some() {
            t.planned_end_at = req.planned_end_at;
        }
        if req.planned_distance_m.is_some() {
            t.planned_distance_m = req.planned_distance_m;
        }

        if let Some(vehicle_id) = req.vehicle_id {
            if vehicle_id != t.vehicle_id {
                self.ensure_vehicle_available(vehicle_id, Some(t.id)).await?;
                t.vehicle_id = vehicle_id;
            }
        }

        match req.trailer_id {
            None => t.trailer_id = None,
            Some(trailer_id) if Some(trailer_id) != t.trailer_id => {
                self.ensure_trailer_available(trailer_id, Some(t.id)).await?;
                t.trailer_id = Some(trailer_id);
            }
            Some(_) => {}
        }

        let (pickup_id, delivery_id) = self.resolve_locations(req).await?;
        t.pickup_location_id = pickup_id;
        t.delivery_location_id = delivery_id;

        self.store.update_transport(&t).await?;
        Ok(t)
    }

    /// Delete a PLANNED transport, cascading its cargo and history.
    pub async fn delete_transport(&self, id: Uuid) -> Result<(), DispatchError> {
        let t = self.require_transport(id).await?;
        if t.status != TransportStatus::Planned {
            return Err(rule("Only PLANNED transports can be deleted"));
        }
        self.store.delete_transport(id).await?;
        tracing::debug!(transport = %id, "transport deleted");
        Ok(())
    }

    /// Assign (or replace) the driver on a PLANNED transport. No status
    /// change, no history row.
    pub async fn assign_driver(
        &self,
        transport_id: Uuid,
        driver_id: Uuid,
    ) -> Result<Transport, DispatchError> {
        let mut t = self.require_transport(transport_id).await?;
        if t.status != TransportStatus::Planned {
            return Err(rule("Driver can be assigned only in PLANNED status"));
        }
        // Self-exclusion keeps re-assigning the same driver a no-op instead
        // of a refusal.
        self.ensure_driver_available(driver_id, Some(t.id)).await?;
        t.driver_id = Some(driver_id);
        self.store.update_transport(&t).await?;
        Ok(t)
    }

    // --- status changes ----------------------------------------------------

    /// Admin path: any non-terminal state to anything except the driver-only
    /// intermediates.
    pub async fn change_status_as_admin(
        &self,
        id: Uuid,
        next: TransportStatus,
        acting_user: Uuid,
    ) -> Result<Transport, DispatchError> {
        let mut t = self.require_transport(id).await?;
        let ctx = TransitionCtx {
            actor: Actor::Admin {
                user_id: acting_user,
            },
            now: Utc::now(),
            driver_busy_elsewhere: false,
        };
        apply_transition(&mut t, next, &ctx)?;
        self.commit_status(&t, next, acting_user, ctx.now).await?;
        Ok(t)
    }

    /// Driver path: strictly linear chain on the transport assigned to this
    /// driver, with the one-IN_PROGRESS-per-driver guard.
    pub async fn change_status_as_driver(
        &self,
        id: Uuid,
        driver_id: Uuid,
        next: TransportStatus,
    ) -> Result<Transport, DispatchError> {
        let mut t = self.require_transport(id).await?;
        let busy = self
            .store
            .driver_on_transport_in(driver_id, &[TransportStatus::InProgress], Some(id))
            .await?;
        let ctx = TransitionCtx {
            actor: Actor::Driver { driver_id },
            now: Utc::now(),
            driver_busy_elsewhere: busy,
        };
        apply_transition(&mut t, next, &ctx)?;
        self.commit_status(&t, next, driver_id, ctx.now).await?;
        Ok(t)
    }

    /// Persist a transition with its history row. The history actor is the
    /// resolved user when the id maps to one, otherwise null.
    async fn commit_status(
        &self,
        t: &Transport,
        next: TransportStatus,
        acting_user: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), DispatchError> {
        let changed_by = self.store.user(acting_user).await?.map(|u| u.id);
        let entry = history_entry(t.id, next, changed_by, at);
        self.store.commit_transition(t, &entry).await?;
        tracing::debug!(transport = %t.id, status = %next, "status changed");
        Ok(())
    }

    // --- reads -------------------------------------------------------------

    pub async fn get_transport(&self, id: Uuid) -> Result<Transport, DispatchError> {
        self.require_transport(id).await
    }

    /// History rows for one transport, newest first.
    pub async fn status_history(
        &self,
        transport_id: Uuid,
    ) -> Result<Vec<StatusHistoryEntry>, DispatchError> {
        self.require_transport(transport_id).await?;
        Ok(self.store.history_for_transport(transport_id).await?)
    }

    /// A driver's transports, newest planned start first.
    pub async fn transports_for_driver(
        &self,
        driver_id: Uuid,
    ) -> Result<Vec<Transport>, DispatchError> {
        Ok(self.store.transports_for_driver(driver_id).await?)
    }

    /// Every history row across the driver's transports, oldest first.
    pub async fn driver_timeline(
        &self,
        driver_id: Uuid,
    ) -> Result<Vec<StatusHistoryEntry>, DispatchError> {
        let transports = self.store.transports_for_driver(driver_id).await?;
        let mut rows = Vec::new();
        for t in &transports {
            rows.extend(self.store.history_for_transport(t.id).await?);
        }
        rows.sort_by_key(|e| e.changed_at);
        Ok(rows)
    }

    // --- shared helpers ----------------------------------------------------

    pub(crate) async fn require_transport(&self, id: Uuid) -> Result<Transport, DispatchError> {
        self.store
            .transport(id)
            .await?
            .ok_or(not_found("Transport", id))
    }

    async fn resolve_locations(
        &self,
        req: &CreateTransportRequest,
    ) -> Result<(Uuid, Uuid), DispatchError> {
        let (pickup_id, delivery_id) = match (req.pickup_location_id, req.delivery_location_id) {
            (Some(p), Some(d)) => (p, d),
            _ => return Err(rule("pickupLocationId and deliveryLocationId are required")),
        };
        if self.store.location(pickup_id).await?.is_none() {
            return Err(not_found("Pickup location", pickup_id));
        }
        if self.store.location(delivery_id).await?.is_none() {
            return Err(not_found("Delivery location", delivery_id));
        }
        Ok((pickup_id, delivery_id))
    }

    async fn ensure_vehicle_available(
        &self,
        vehicle_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<(), DispatchError> {
        match vehicle_availability(self.store.as_ref(), vehicle_id, exclude).await? {
            Availability::Available => Ok(()),
            Availability::InactiveStatus => Err(rule("Vehicle is not ACTIVE")),
            Availability::OnActiveTransport => {
                Err(rule("Vehicle is already assigned to an active transport"))
            }
        }
    }

    async fn ensure_trailer_available(
        &self,
        trailer_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<(), DispatchError> {
        match trailer_availability(self.store.as_ref(), trailer_id, exclude).await? {
            Availability::Available => Ok(()),
            Availability::InactiveStatus => Err(rule("Trailer is not ACTIVE")),
            Availability::OnActiveTransport => {
                Err(rule("Trailer is already assigned to an active transport"))
            }
        }
    }

    async fn ensure_driver_available(
        &self,
        driver_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<(), DispatchError> {
        match driver_availability(self.store.as_ref(), driver_id, exclude).await? {
            Availability::Available => Ok(()),
            Availability::InactiveStatus => Err(rule("Driver is not AVAILABLE")),
            Availability::OnActiveTransport => {
                Err(rule("Driver already has an active transport"))
            }
        }
    }
}

/// Planned end must not precede planned start; either side may be absent.
fn validate_planned_dates(req: &CreateTransportRequest) -> Result<(), DispatchError> {
    if let (Some(start), Some(end)) = (req.planned_start_at, req.planned_end_at) {
        if end < start {
            return Err(rule("Planned end must be after planned start"));
        }
    }
    Ok(())
}

fn history_entry(
    transport_id: Uuid,
    status: TransportStatus,
    changed_by: Option<Uuid>,
    at: DateTime<Utc>,
) -> StatusHistoryEntry {
    StatusHistoryEntry {
        id: Uuid::new_v4(),
        transport_id,
        status,
        changed_by,
        changed_at: at,
    }
}
