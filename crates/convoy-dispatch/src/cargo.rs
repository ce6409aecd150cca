//! Cargo operations. Capacity arithmetic lives in `convoy-capacity`; this
//! module loads the live trailer and cargo set and applies the gates.

use uuid::Uuid;

use convoy_capacity::{validate_cargo_dates, validate_volume, validate_weight};
use convoy_domain::{Cargo, CreateCargoRequest, TransportStatus, UpdateCargoRequest};

use crate::error::{not_found, rule};
use crate::{DispatchError, Dispatcher};

impl Dispatcher {
    /// Add cargo to a PLANNED or ACCEPTED transport.
    pub async fn create_cargo(
        &self,
        transport_id: Uuid,
        req: &CreateCargoRequest,
    ) -> Result<Cargo, DispatchError> {
        let t = self.require_transport(transport_id).await?;
        if !matches!(
            t.status,
            TransportStatus::Planned | TransportStatus::Accepted
        ) {
            return Err(rule("Cargo can be added only to PLANNED or ACCEPTED transport"));
        }

        let (payload_g, volume_l) = self.trailer_capacity(t.trailer_id).await?;
        let existing = self.store.cargo_for_transport(transport_id).await?;
        validate_weight(payload_g, &existing, None, req.weight_g)?;
        validate_volume(volume_l, &existing, None, req.volume_l)?;
        validate_cargo_dates(req.pickup_date, req.delivery_date)?;

        let cargo = Cargo {
            id: Uuid::new_v4(),
            transport_id,
            description: req.description.trim().to_string(),
            weight_g: req.weight_g,
            volume_l: req.volume_l,
            pickup_date: req.pickup_date,
            delivery_date: req.delivery_date,
        };
        self.store.insert_cargo(&cargo).await?;
        tracing::debug!(cargo = %cargo.id, transport = %transport_id, "cargo added");
        Ok(cargo)
    }

    /// Partial cargo edit while the owning transport is PLANNED or ACCEPTED.
    ///
    /// Supplied weight/volume are re-validated against the trailer with the
    /// edited row excluded from the existing sum. Dates validate as the
    /// merged pair, so setting one side cannot silently invert the other.
    pub async fn update_cargo(
        &self,
        cargo_id: Uuid,
        req: &UpdateCargoRequest,
    ) -> Result<Cargo, DispatchError> {
        let mut c = self
            .store
            .cargo(cargo_id)
            .await?
            .ok_or(not_found("Cargo", cargo_id))?;
        let t = self.require_transport(c.transport_id).await?;
        if !matches!(
            t.status,
            TransportStatus::Planned | TransportStatus::Accepted
        ) {
            return Err(rule("Cargo can be edited only in PLANNED or ACCEPTED transport"));
        }

        if req.weight_g.is_some() || req.volume_l.is_some() {
            let (payload_g, volume_cap) = self.trailer_capacity(t.trailer_id).await?;
            let existing = self.store.cargo_for_transport(t.id).await?;
            if let Some(weight_g) = req.weight_g {
                validate_weight(payload_g, &existing, Some(c.id), weight_g)?;
                c.weight_g = weight_g;
            }
            if let Some(volume_l) = req.volume_l {
                validate_volume(volume_cap, &existing, Some(c.id), volume_l)?;
                c.volume_l = volume_l;
            }
        }

        let next_pickup = req.pickup_date.or(c.pickup_date);
        let next_delivery = req.delivery_date.or(c.delivery_date);
        validate_cargo_dates(next_pickup, next_delivery)?;
        c.pickup_date = next_pickup;
        c.delivery_date = next_delivery;

        if let Some(description) = &req.description {
            c.description = description.trim().to_string();
        }

        self.store.update_cargo(&c).await?;
        Ok(c)
    }

    /// Remove cargo; allowed only while the owning transport is PLANNED.
    pub async fn delete_cargo(&self, cargo_id: Uuid) -> Result<(), DispatchError> {
        let c = self
            .store
            .cargo(cargo_id)
            .await?
            .ok_or(not_found("Cargo", cargo_id))?;
        let t = self.require_transport(c.transport_id).await?;
        if t.status != TransportStatus::Planned {
            return Err(rule(format!(
                "Cargo belongs to transport #{} in status {} and cannot be deleted after acceptance",
                t.id, t.status
            )));
        }
        self.store.delete_cargo(cargo_id).await?;
        Ok(())
    }

    /// Cargo owned by one transport.
    pub async fn cargo_for_transport(
        &self,
        transport_id: Uuid,
    ) -> Result<Vec<Cargo>, DispatchError> {
        self.require_transport(transport_id).await?;
        Ok(self.store.cargo_for_transport(transport_id).await?)
    }

    /// Capacity limits of the transport's trailer. `(None, None)` when the
    /// transport has no trailer; the capacity validator turns that into the
    /// no-trailer refusals.
    async fn trailer_capacity(
        &self,
        trailer_id: Option<Uuid>,
    ) -> Result<(Option<i64>, Option<i64>), DispatchError> {
        match trailer_id {
            None => Ok((None, None)),
            Some(id) => {
                let trailer = self
                    .store
                    .trailer(id)
                    .await?
                    .ok_or(not_found("Trailer", id))?;
                Ok((trailer.payload_g, trailer.volume_l))
            }
        }
    }
}
