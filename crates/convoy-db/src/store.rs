//! `PgStore`: the Postgres implementation of the `FleetStore` port.
//!
//! Guarded writes open one transaction, row-lock the resources whose
//! exclusivity they must preserve, re-run the scan inside that transaction
//! and only then write. Concurrent writers against the same resource
//! serialize on the row lock, so a scan cannot go stale between check and
//! write. Cargo and history rows hang off `transports` with ON DELETE
//! CASCADE, which makes transport deletion a single statement.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use convoy_domain::status::UnknownStatus;
use convoy_domain::{
    Cargo, Driver, DriverStatus, Location, StatusHistoryEntry, Trailer, TrailerStatus,
    Transport, TransportStatus, User, Vehicle, VehicleStatus,
};
use convoy_store::{FleetStore, StoreError, ACTIVE_STATUSES};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ---------------------------------------------------------------------------
// Error and row helpers
// ---------------------------------------------------------------------------

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn col<'r, T>(row: &'r PgRow, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name).map_err(backend)
}

/// A status string the database holds but the enum does not know is a
/// corrupt row, surfaced as a backend error.
fn parse_status<T>(raw: String) -> Result<T, StoreError>
where
    T: std::str::FromStr<Err = UnknownStatus>,
{
    raw.parse()
        .map_err(|e: UnknownStatus| StoreError::Backend(e.to_string()))
}

fn status_texts(statuses: &[TransportStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

fn transport_from_row(row: &PgRow) -> Result<Transport, StoreError> {
    Ok(Transport {
        id: col(row, "id")?,
        status: parse_status(col::<String>(row, "status")?)?,
        contractual_due_at: col(row, "contractual_due_at")?,
        planned_start_at: col(row, "planned_start_at")?,
        planned_end_at: col(row, "planned_end_at")?,
        actual_start_at: col(row, "actual_start_at")?,
        actual_end_at: col(row, "actual_end_at")?,
        planned_distance_m: col(row, "planned_distance_m")?,
        actual_distance_m: col(row, "actual_distance_m")?,
        vehicle_id: col(row, "vehicle_id")?,
        trailer_id: col(row, "trailer_id")?,
        driver_id: col(row, "driver_id")?,
        pickup_location_id: col(row, "pickup_location_id")?,
        delivery_location_id: col(row, "delivery_location_id")?,
        created_by: col(row, "created_by")?,
    })
}

fn vehicle_from_row(row: &PgRow) -> Result<Vehicle, StoreError> {
    Ok(Vehicle {
        id: col(row, "id")?,
        manufacturer: col(row, "manufacturer")?,
        model: col(row, "model")?,
        license_plate: col(row, "license_plate")?,
        date_of_production: col(row, "date_of_production")?,
        mileage_km: col(row, "mileage_km")?,
        fuel_type: parse_status(col::<String>(row, "fuel_type")?)?,
        allowed_load_g: col(row, "allowed_load_g")?,
        insurance_number: col(row, "insurance_number")?,
        status: parse_status(col::<String>(row, "status")?)?,
    })
}

fn trailer_from_row(row: &PgRow) -> Result<Trailer, StoreError> {
    Ok(Trailer {
        id: col(row, "id")?,
        name: col(row, "name")?,
        license_plate: col(row, "license_plate")?,
        payload_g: col(row, "payload_g")?,
        volume_l: col(row, "volume_l")?,
        status: parse_status(col::<String>(row, "status")?)?,
    })
}

fn driver_from_row(row: &PgRow) -> Result<Driver, StoreError> {
    Ok(Driver {
        user_id: col(row, "user_id")?,
        license_number: col(row, "license_number")?,
        license_category: col(row, "license_category")?,
        license_expiry: col(row, "license_expiry")?,
        status: parse_status(col::<String>(row, "status")?)?,
    })
}

fn location_from_row(row: &PgRow) -> Result<Location, StoreError> {
    Ok(Location {
        id: col(row, "id")?,
        street: col(row, "street")?,
        building_number: col(row, "building_number")?,
        city: col(row, "city")?,
        postcode: col(row, "postcode")?,
        country: col(row, "country")?,
        latitude: col(row, "latitude")?,
        longitude: col(row, "longitude")?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    Ok(User {
        id: col(row, "id")?,
        display_name: col(row, "display_name")?,
    })
}

fn cargo_from_row(row: &PgRow) -> Result<Cargo, StoreError> {
    Ok(Cargo {
        id: col(row, "id")?,
        transport_id: col(row, "transport_id")?,
        description: col(row, "description")?,
        weight_g: col(row, "weight_g")?,
        volume_l: col(row, "volume_l")?,
        pickup_date: col(row, "pickup_date")?,
        delivery_date: col(row, "delivery_date")?,
    })
}

fn history_from_row(row: &PgRow) -> Result<StatusHistoryEntry, StoreError> {
    Ok(StatusHistoryEntry {
        id: col(row, "id")?,
        transport_id: col(row, "transport_id")?,
        status: parse_status(col::<String>(row, "status")?)?,
        changed_by: col(row, "changed_by")?,
        changed_at: col(row, "changed_at")?,
    })
}

// ---------------------------------------------------------------------------
// Exclusivity scans (shared by the trait methods and the tx guards)
// ---------------------------------------------------------------------------

async fn vehicle_scan<'e, E>(
    exec: E,
    vehicle_id: Uuid,
    statuses: &[TransportStatus],
    exclude: Option<Uuid>,
) -> Result<bool, StoreError>
where
    E: PgExecutor<'e>,
{
    let (found,): (bool,) = sqlx::query_as(
        r#"
        select exists (
            select 1 from transports
            where vehicle_id = $1
              and status = any($2)
              and ($3::uuid is null or id <> $3)
        )
        "#,
    )
    .bind(vehicle_id)
    .bind(status_texts(statuses))
    .bind(exclude)
    .fetch_one(exec)
    .await
    .map_err(backend)?;
    Ok(found)
}

async fn trailer_scan<'e, E>(
    exec: E,
    trailer_id: Uuid,
    statuses: &[TransportStatus],
    exclude: Option<Uuid>,
) -> Result<bool, StoreError>
where
    E: PgExecutor<'e>,
{
    let (found,): (bool,) = sqlx::query_as(
        r#"
        select exists (
            select 1 from transports
            where trailer_id = $1
              and status = any($2)
              and ($3::uuid is null or id <> $3)
        )
        "#,
    )
    .bind(trailer_id)
    .bind(status_texts(statuses))
    .bind(exclude)
    .fetch_one(exec)
    .await
    .map_err(backend)?;
    Ok(found)
}

async fn driver_scan<'e, E>(
    exec: E,
    driver_id: Uuid,
    statuses: &[TransportStatus],
    exclude: Option<Uuid>,
) -> Result<bool, StoreError>
where
    E: PgExecutor<'e>,
{
    let (found,): (bool,) = sqlx::query_as(
        r#"
        select exists (
            select 1 from transports
            where driver_id = $1
              and status = any($2)
              and ($3::uuid is null or id <> $3)
        )
        "#,
    )
    .bind(driver_id)
    .bind(status_texts(statuses))
    .bind(exclude)
    .fetch_one(exec)
    .await
    .map_err(backend)?;
    Ok(found)
}

// ---------------------------------------------------------------------------
// Transaction building blocks
// ---------------------------------------------------------------------------

/// Row-lock one resource so concurrent guarded writes serialize before
/// re-running the scan. Locking an absent id is a no-op, which is fine:
/// a row that does not exist cannot be double-booked.
async fn lock_row(
    tx: &mut Transaction<'_, Postgres>,
    sql: &str,
    id: Uuid,
) -> Result<(), StoreError> {
    sqlx::query(sql)
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(backend)?;
    Ok(())
}

/// Lock the transport row itself; a missing row aborts the transaction.
async fn require_transport_row(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<(), StoreError> {
    let found = sqlx::query("select 1 from transports where id = $1 for update")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(backend)?;
    match found {
        Some(_) => Ok(()),
        None => Err(StoreError::MissingRow {
            entity: "transport",
            id,
        }),
    }
}

/// Vehicle/trailer exclusivity for an active transport row about to be
/// written. Terminal rows hold nothing and skip the guard entirely.
async fn guard_resources(
    tx: &mut Transaction<'_, Postgres>,
    t: &Transport,
    exclude: Option<Uuid>,
) -> Result<(), StoreError> {
    if !t.status.is_active() {
        return Ok(());
    }
    lock_row(tx, "select 1 from vehicles where id = $1 for update", t.vehicle_id).await?;
    if vehicle_scan(&mut **tx, t.vehicle_id, &ACTIVE_STATUSES, exclude).await? {
        return Err(StoreError::Conflict(
            "Vehicle is already assigned to an active transport".to_string(),
        ));
    }
    if let Some(trailer_id) = t.trailer_id {
        lock_row(tx, "select 1 from trailers where id = $1 for update", trailer_id).await?;
        if trailer_scan(&mut **tx, trailer_id, &ACTIVE_STATUSES, exclude).await? {
            return Err(StoreError::Conflict(
                "Trailer is already assigned to an active transport".to_string(),
            ));
        }
    }
    Ok(())
}

async fn insert_transport_row(
    tx: &mut Transaction<'_, Postgres>,
    t: &Transport,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        insert into transports (
            id, status, contractual_due_at, planned_start_at, planned_end_at,
            actual_start_at, actual_end_at, planned_distance_m,
            actual_distance_m, vehicle_id, trailer_id, driver_id,
            pickup_location_id, delivery_location_id, created_by
        ) values (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15
        )
        "#,
    )
    .bind(t.id)
    .bind(t.status.as_str())
    .bind(t.contractual_due_at)
    .bind(t.planned_start_at)
    .bind(t.planned_end_at)
    .bind(t.actual_start_at)
    .bind(t.actual_end_at)
    .bind(t.planned_distance_m)
    .bind(t.actual_distance_m)
    .bind(t.vehicle_id)
    .bind(t.trailer_id)
    .bind(t.driver_id)
    .bind(t.pickup_location_id)
    .bind(t.delivery_location_id)
    .bind(t.created_by)
    .execute(&mut **tx)
    .await
    .map_err(backend)?;
    Ok(())
}

/// Full-row replace, mirroring the in-memory store's update semantics.
async fn update_transport_row(
    tx: &mut Transaction<'_, Postgres>,
    t: &Transport,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        update transports set
            status = $2,
            contractual_due_at = $3,
            planned_start_at = $4,
            planned_end_at = $5,
            actual_start_at = $6,
            actual_end_at = $7,
            planned_distance_m = $8,
            actual_distance_m = $9,
            vehicle_id = $10,
            trailer_id = $11,
            driver_id = $12,
            pickup_location_id = $13,
            delivery_location_id = $14,
            created_by = $15
        where id = $1
        "#,
    )
    .bind(t.id)
    .bind(t.status.as_str())
    .bind(t.contractual_due_at)
    .bind(t.planned_start_at)
    .bind(t.planned_end_at)
    .bind(t.actual_start_at)
    .bind(t.actual_end_at)
    .bind(t.planned_distance_m)
    .bind(t.actual_distance_m)
    .bind(t.vehicle_id)
    .bind(t.trailer_id)
    .bind(t.driver_id)
    .bind(t.pickup_location_id)
    .bind(t.delivery_location_id)
    .bind(t.created_by)
    .execute(&mut **tx)
    .await
    .map_err(backend)?;
    Ok(())
}

async fn insert_history_row(
    tx: &mut Transaction<'_, Postgres>,
    e: &StatusHistoryEntry,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        insert into status_history (id, transport_id, status, changed_by, changed_at)
        values ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(e.id)
    .bind(e.transport_id)
    .bind(e.status.as_str())
    .bind(e.changed_by)
    .bind(e.changed_at)
    .execute(&mut **tx)
    .await
    .map_err(backend)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// FleetStore impl
// ---------------------------------------------------------------------------

#[async_trait]
impl FleetStore for PgStore {
    // --- entity reads ------------------------------------------------------

    async fn transport(&self, id: Uuid) -> Result<Option<Transport>, StoreError> {
        let row = sqlx::query(
            r#"
            select id, status, contractual_due_at, planned_start_at,
                   planned_end_at, actual_start_at, actual_end_at,
                   planned_distance_m, actual_distance_m, vehicle_id,
                   trailer_id, driver_id, pickup_location_id,
                   delivery_location_id, created_by
            from transports where id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        row.as_ref().map(transport_from_row).transpose()
    }

    async fn vehicle(&self, id: Uuid) -> Result<Option<Vehicle>, StoreError> {
        let row = sqlx::query(
            r#"
            select id, manufacturer, model, license_plate, date_of_production,
                   mileage_km, fuel_type, allowed_load_g, insurance_number, status
            from vehicles where id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        row.as_ref().map(vehicle_from_row).transpose()
    }

    async fn trailer(&self, id: Uuid) -> Result<Option<Trailer>, StoreError> {
        let row = sqlx::query(
            r#"
            select id, name, license_plate, payload_g, volume_l, status
            from trailers where id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        row.as_ref().map(trailer_from_row).transpose()
    }

    async fn driver(&self, user_id: Uuid) -> Result<Option<Driver>, StoreError> {
        let row = sqlx::query(
            r#"
            select user_id, license_number, license_category, license_expiry, status
            from drivers where user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        row.as_ref().map(driver_from_row).transpose()
    }

    async fn location(&self, id: Uuid) -> Result<Option<Location>, StoreError> {
        let row = sqlx::query(
            r#"
            select id, street, building_number, city, postcode, country,
                   latitude, longitude
            from locations where id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        row.as_ref().map(location_from_row).transpose()
    }

    async fn user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("select id, display_name from users where id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn cargo(&self, id: Uuid) -> Result<Option<Cargo>, StoreError> {
        let row = sqlx::query(
            r#"
            select id, transport_id, description, weight_g, volume_l,
                   pickup_date, delivery_date
            from cargo where id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        row.as_ref().map(cargo_from_row).transpose()
    }

    // --- listings ----------------------------------------------------------

    async fn vehicles(&self) -> Result<Vec<Vehicle>, StoreError> {
        let rows = sqlx::query(
            r#"
            select id, manufacturer, model, license_plate, date_of_production,
                   mileage_km, fuel_type, allowed_load_g, insurance_number, status
            from vehicles order by license_plate
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(vehicle_from_row).collect()
    }

    async fn trailers(&self) -> Result<Vec<Trailer>, StoreError> {
        let rows = sqlx::query(
            r#"
            select id, name, license_plate, payload_g, volume_l, status
            from trailers order by license_plate
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(trailer_from_row).collect()
    }

    async fn drivers(&self) -> Result<Vec<Driver>, StoreError> {
        let rows = sqlx::query(
            r#"
            select user_id, license_number, license_category, license_expiry, status
            from drivers order by license_number
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(driver_from_row).collect()
    }

    async fn transports_for_driver(&self, driver_id: Uuid) -> Result<Vec<Transport>, StoreError> {
        let rows = sqlx::query(
            r#"
            select id, status, contractual_due_at, planned_start_at,
                   planned_end_at, actual_start_at, actual_end_at,
                   planned_distance_m, actual_distance_m, vehicle_id,
                   trailer_id, driver_id, pickup_location_id,
                   delivery_location_id, created_by
            from transports
            where driver_id = $1
            order by planned_start_at desc nulls last
            "#,
        )
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(transport_from_row).collect()
    }

    async fn cargo_for_transport(&self, transport_id: Uuid) -> Result<Vec<Cargo>, StoreError> {
        let rows = sqlx::query(
            r#"
            select id, transport_id, description, weight_g, volume_l,
                   pickup_date, delivery_date
            from cargo where transport_id = $1
            order by id
            "#,
        )
        .bind(transport_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(cargo_from_row).collect()
    }

    async fn history_for_transport(
        &self,
        transport_id: Uuid,
    ) -> Result<Vec<StatusHistoryEntry>, StoreError> {
        let rows = sqlx::query(
            r#"
            select id, transport_id, status, changed_by, changed_at
            from status_history where transport_id = $1
            order by changed_at desc
            "#,
        )
        .bind(transport_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(history_from_row).collect()
    }

    // --- exclusivity scans -------------------------------------------------

    async fn vehicle_on_transport_in(
        &self,
        vehicle_id: Uuid,
        statuses: &[TransportStatus],
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        vehicle_scan(&self.pool, vehicle_id, statuses, exclude).await
    }

    async fn trailer_on_transport_in(
        &self,
        trailer_id: Uuid,
        statuses: &[TransportStatus],
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        trailer_scan(&self.pool, trailer_id, statuses, exclude).await
    }

    async fn driver_on_transport_in(
        &self,
        driver_id: Uuid,
        statuses: &[TransportStatus],
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        driver_scan(&self.pool, driver_id, statuses, exclude).await
    }

    async fn vehicle_referenced(&self, vehicle_id: Uuid) -> Result<bool, StoreError> {
        let (found,): (bool,) =
            sqlx::query_as("select exists (select 1 from transports where vehicle_id = $1)")
                .bind(vehicle_id)
                .fetch_one(&self.pool)
                .await
                .map_err(backend)?;
        Ok(found)
    }

    async fn trailer_referenced(&self, trailer_id: Uuid) -> Result<bool, StoreError> {
        let (found,): (bool,) =
            sqlx::query_as("select exists (select 1 from transports where trailer_id = $1)")
                .bind(trailer_id)
                .fetch_one(&self.pool)
                .await
                .map_err(backend)?;
        Ok(found)
    }

    // --- transport writes (guarded) ----------------------------------------

    async fn insert_transport(
        &self,
        t: &Transport,
        first_entry: &StatusHistoryEntry,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;
        guard_resources(&mut tx, t, None).await?;
        insert_transport_row(&mut tx, t).await?;
        insert_history_row(&mut tx, first_entry).await?;
        tx.commit().await.map_err(backend)?;
        Ok(())
    }

    async fn update_transport(&self, t: &Transport) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;
        require_transport_row(&mut tx, t.id).await?;
        guard_resources(&mut tx, t, Some(t.id)).await?;
        update_transport_row(&mut tx, t).await?;
        tx.commit().await.map_err(backend)?;
        Ok(())
    }

    async fn commit_transition(
        &self,
        t: &Transport,
        entry: &StatusHistoryEntry,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;
        require_transport_row(&mut tx, t.id).await?;
        // One driver, one IN_PROGRESS transport: re-checked on the locked
        // driver row in the same transaction that writes the transition.
        if matches!(
            t.status,
            TransportStatus::Accepted | TransportStatus::InProgress
        ) {
            if let Some(driver_id) = t.driver_id {
                lock_row(&mut tx, "select 1 from drivers where user_id = $1 for update", driver_id)
                    .await?;
                if driver_scan(&mut *tx, driver_id, &[TransportStatus::InProgress], Some(t.id))
                    .await?
                {
                    return Err(StoreError::Conflict(
                        "Driver already has a transport in progress".to_string(),
                    ));
                }
            }
        }
        update_transport_row(&mut tx, t).await?;
        insert_history_row(&mut tx, entry).await?;
        tx.commit().await.map_err(backend)?;
        Ok(())
    }

    async fn delete_transport(&self, id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query("delete from transports where id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::MissingRow {
                entity: "transport",
                id,
            });
        }
        Ok(())
    }

    // --- cargo writes ------------------------------------------------------

    async fn insert_cargo(&self, c: &Cargo) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            insert into cargo (
                id, transport_id, description, weight_g, volume_l,
                pickup_date, delivery_date
            ) values ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(c.id)
        .bind(c.transport_id)
        .bind(&c.description)
        .bind(c.weight_g)
        .bind(c.volume_l)
        .bind(c.pickup_date)
        .bind(c.delivery_date)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn update_cargo(&self, c: &Cargo) -> Result<(), StoreError> {
        let res = sqlx::query(
            r#"
            update cargo set
                transport_id = $2,
                description = $3,
                weight_g = $4,
                volume_l = $5,
                pickup_date = $6,
                delivery_date = $7
            where id = $1
            "#,
        )
        .bind(c.id)
        .bind(c.transport_id)
        .bind(&c.description)
        .bind(c.weight_g)
        .bind(c.volume_l)
        .bind(c.pickup_date)
        .bind(c.delivery_date)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::MissingRow {
                entity: "cargo",
                id: c.id,
            });
        }
        Ok(())
    }

    async fn delete_cargo(&self, id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query("delete from cargo where id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::MissingRow { entity: "cargo", id });
        }
        Ok(())
    }

    // --- resource writes ---------------------------------------------------

    async fn insert_vehicle(&self, v: &Vehicle) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            insert into vehicles (
                id, manufacturer, model, license_plate, date_of_production,
                mileage_km, fuel_type, allowed_load_g, insurance_number, status
            ) values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(v.id)
        .bind(&v.manufacturer)
        .bind(&v.model)
        .bind(&v.license_plate)
        .bind(v.date_of_production)
        .bind(v.mileage_km)
        .bind(v.fuel_type.as_str())
        .bind(v.allowed_load_g)
        .bind(&v.insurance_number)
        .bind(v.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn insert_trailer(&self, t: &Trailer) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            insert into trailers (id, name, license_plate, payload_g, volume_l, status)
            values ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(t.id)
        .bind(&t.name)
        .bind(&t.license_plate)
        .bind(t.payload_g)
        .bind(t.volume_l)
        .bind(t.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn insert_driver(&self, d: &Driver) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            insert into drivers (
                user_id, license_number, license_category, license_expiry, status
            ) values ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(d.user_id)
        .bind(&d.license_number)
        .bind(&d.license_category)
        .bind(d.license_expiry)
        .bind(d.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn insert_location(&self, l: &Location) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            insert into locations (
                id, street, building_number, city, postcode, country,
                latitude, longitude
            ) values ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(l.id)
        .bind(&l.street)
        .bind(&l.building_number)
        .bind(&l.city)
        .bind(&l.postcode)
        .bind(&l.country)
        .bind(l.latitude)
        .bind(l.longitude)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn insert_user(&self, u: &User) -> Result<(), StoreError> {
        sqlx::query("insert into users (id, display_name) values ($1, $2)")
            .bind(u.id)
            .bind(&u.display_name)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn update_vehicle_status(
        &self,
        id: Uuid,
        status: VehicleStatus,
    ) -> Result<(), StoreError> {
        let res = sqlx::query("update vehicles set status = $2 where id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::MissingRow {
                entity: "vehicle",
                id,
            });
        }
        Ok(())
    }

    async fn update_trailer_status(
        &self,
        id: Uuid,
        status: TrailerStatus,
    ) -> Result<(), StoreError> {
        let res = sqlx::query("update trailers set status = $2 where id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::MissingRow {
                entity: "trailer",
                id,
            });
        }
        Ok(())
    }

    async fn update_driver_status(
        &self,
        user_id: Uuid,
        status: DriverStatus,
    ) -> Result<(), StoreError> {
        let res = sqlx::query("update drivers set status = $2 where user_id = $1")
            .bind(user_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::MissingRow {
                entity: "driver",
                id: user_id,
            });
        }
        Ok(())
    }

    async fn delete_vehicle(&self, id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query("delete from vehicles where id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::MissingRow {
                entity: "vehicle",
                id,
            });
        }
        Ok(())
    }

    async fn delete_trailer(&self, id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query("delete from trailers where id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::MissingRow {
                entity: "trailer",
                id,
            });
        }
        Ok(())
    }
}
