//! Scenario: PgStore re-checks exclusivity inside the write transaction.
//!
//! # Invariants under test
//! 1. A second ACTIVE transport on a held vehicle is refused, and nothing
//!    of the refused write lands (the transaction rolls back).
//! 2. The trailer rule mirrors the vehicle rule.
//! 3. `update_transport` excludes the transport itself from the rescan, so
//!    keeping your own resources is never a conflict.
//! 4. `commit_transition` re-checks one IN_PROGRESS transport per driver
//!    and rolls back the transition on refusal.
//! 5. Terminal rows hold no resources: they neither trip the guard nor
//!    block a new ACTIVE row.
//!
//! All tests skip gracefully when `CONVOY_DATABASE_URL` is not set. Every
//! run seeds fresh v4 ids, so a dirty database is fine.

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use convoy_db::PgStore;
use convoy_domain::{
    Driver, DriverStatus, FuelType, Location, StatusHistoryEntry, Trailer, TrailerStatus,
    Transport, TransportStatus, User, Vehicle, VehicleStatus, METRES_PER_KM,
};
use convoy_store::{FleetStore, StoreError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn make_store(url: &str) -> anyhow::Result<PgStore> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(url)
        .await?;
    convoy_db::migrate(&pool).await?;
    Ok(PgStore::new(pool))
}

struct Seed {
    admin: Uuid,
    driver: Uuid,
    vehicle: Uuid,
    second_vehicle: Uuid,
    trailer: Uuid,
    pickup: Uuid,
    delivery: Uuid,
}

async fn seed_fleet(store: &PgStore) -> anyhow::Result<Seed> {
    let seed = Seed {
        admin: Uuid::new_v4(),
        driver: Uuid::new_v4(),
        vehicle: Uuid::new_v4(),
        second_vehicle: Uuid::new_v4(),
        trailer: Uuid::new_v4(),
        pickup: Uuid::new_v4(),
        delivery: Uuid::new_v4(),
    };

    for (id, name) in [(seed.admin, "Test Admin"), (seed.driver, "Jan Kowalski")] {
        store
            .insert_user(&User {
                id,
                display_name: name.to_string(),
            })
            .await?;
    }
    store
        .insert_driver(&Driver {
            user_id: seed.driver,
            license_number: format!("PL-{}", seed.driver),
            license_category: None,
            license_expiry: None,
            status: DriverStatus::Available,
        })
        .await?;
    for id in [seed.vehicle, seed.second_vehicle] {
        store
            .insert_vehicle(&Vehicle {
                id,
                manufacturer: "Volvo".to_string(),
                model: "FH16".to_string(),
                license_plate: format!("WGM-{id}"),
                date_of_production: None,
                mileage_km: None,
                fuel_type: FuelType::Diesel,
                allowed_load_g: None,
                insurance_number: None,
                status: VehicleStatus::Active,
            })
            .await?;
    }
    store
        .insert_trailer(&Trailer {
            id: seed.trailer,
            name: "curtainsider".to_string(),
            license_plate: format!("WGM-{}T", seed.trailer),
            payload_g: None,
            volume_l: None,
            status: TrailerStatus::Active,
        })
        .await?;
    for (id, street, city) in [
        (seed.pickup, "Magazynowa 12", "Warsaw"),
        (seed.delivery, "Portowa 3", "Gdansk"),
    ] {
        store
            .insert_location(&Location {
                id,
                street: street.to_string(),
                building_number: None,
                city: city.to_string(),
                postcode: None,
                country: "Poland".to_string(),
                latitude: None,
                longitude: None,
            })
            .await?;
    }
    Ok(seed)
}

fn transport_on(seed: &Seed, vehicle_id: Uuid, driver_id: Option<Uuid>) -> Transport {
    Transport {
        id: Uuid::new_v4(),
        status: TransportStatus::Planned,
        contractual_due_at: None,
        planned_start_at: Some(Utc.with_ymd_and_hms(2025, 7, 1, 6, 0, 0).unwrap()),
        planned_end_at: None,
        actual_start_at: None,
        actual_end_at: None,
        planned_distance_m: Some(420 * METRES_PER_KM),
        actual_distance_m: None,
        vehicle_id,
        trailer_id: None,
        driver_id,
        pickup_location_id: seed.pickup,
        delivery_location_id: seed.delivery,
        created_by: seed.admin,
    }
}

fn seed_entry(t: &Transport) -> StatusHistoryEntry {
    StatusHistoryEntry {
        id: Uuid::new_v4(),
        transport_id: t.id,
        status: t.status,
        changed_by: None,
        changed_at: Utc.with_ymd_and_hms(2025, 7, 1, 5, 0, 0).unwrap(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn vehicle_exclusivity_is_rechecked_inside_the_insert() -> anyhow::Result<()> {
    let url = match std::env::var(convoy_db::ENV_DB_URL) {
        Ok(v) => v,
        Err(_) => {
            eprintln!("SKIP: CONVOY_DATABASE_URL not set");
            return Ok(());
        }
    };

    let store = make_store(&url).await?;
    let seed = seed_fleet(&store).await?;

    let first = transport_on(&seed, seed.vehicle, None);
    store.insert_transport(&first, &seed_entry(&first)).await?;

    let second = transport_on(&seed, seed.vehicle, None);
    let err = store
        .insert_transport(&second, &seed_entry(&second))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::Conflict("Vehicle is already assigned to an active transport".to_string())
    );

    // The refused write left nothing behind.
    assert!(store.transport(second.id).await?.is_none());
    assert!(store.history_for_transport(second.id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn trailer_exclusivity_is_rechecked_inside_the_insert() -> anyhow::Result<()> {
    let url = match std::env::var(convoy_db::ENV_DB_URL) {
        Ok(v) => v,
        Err(_) => {
            eprintln!("SKIP: CONVOY_DATABASE_URL not set");
            return Ok(());
        }
    };

    let store = make_store(&url).await?;
    let seed = seed_fleet(&store).await?;

    let mut first = transport_on(&seed, seed.vehicle, None);
    first.trailer_id = Some(seed.trailer);
    store.insert_transport(&first, &seed_entry(&first)).await?;

    // Different vehicle, same trailer.
    let mut second = transport_on(&seed, seed.second_vehicle, None);
    second.trailer_id = Some(seed.trailer);
    let err = store
        .insert_transport(&second, &seed_entry(&second))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::Conflict("Trailer is already assigned to an active transport".to_string())
    );

    Ok(())
}

#[tokio::test]
async fn update_excludes_the_transport_itself() -> anyhow::Result<()> {
    let url = match std::env::var(convoy_db::ENV_DB_URL) {
        Ok(v) => v,
        Err(_) => {
            eprintln!("SKIP: CONVOY_DATABASE_URL not set");
            return Ok(());
        }
    };

    let store = make_store(&url).await?;
    let seed = seed_fleet(&store).await?;

    let mut t = transport_on(&seed, seed.vehicle, None);
    t.trailer_id = Some(seed.trailer);
    store.insert_transport(&t, &seed_entry(&t)).await?;

    // Same vehicle and trailer: the rescan skips the row being replaced.
    t.planned_distance_m = Some(505 * METRES_PER_KM);
    store.update_transport(&t).await?;

    let stored = store.transport(t.id).await?.unwrap();
    assert_eq!(stored.planned_distance_m, Some(505 * METRES_PER_KM));
    assert_eq!(stored.trailer_id, Some(seed.trailer));

    // Updating an absent transport is a missing row, not a silent insert.
    let ghost = transport_on(&seed, seed.second_vehicle, None);
    let err = store.update_transport(&ghost).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::MissingRow {
            entity: "transport",
            ..
        }
    ));

    Ok(())
}

#[tokio::test]
async fn transition_refuses_a_second_in_progress_for_the_driver() -> anyhow::Result<()> {
    let url = match std::env::var(convoy_db::ENV_DB_URL) {
        Ok(v) => v,
        Err(_) => {
            eprintln!("SKIP: CONVOY_DATABASE_URL not set");
            return Ok(());
        }
    };

    let store = make_store(&url).await?;
    let seed = seed_fleet(&store).await?;

    let mut running = transport_on(&seed, seed.vehicle, Some(seed.driver));
    running.status = TransportStatus::InProgress;
    store
        .insert_transport(&running, &seed_entry(&running))
        .await?;

    let waiting = transport_on(&seed, seed.second_vehicle, Some(seed.driver));
    store
        .insert_transport(&waiting, &seed_entry(&waiting))
        .await?;

    let mut next = waiting.clone();
    next.status = TransportStatus::Accepted;
    let entry = StatusHistoryEntry {
        id: Uuid::new_v4(),
        transport_id: next.id,
        status: next.status,
        changed_by: Some(seed.driver),
        changed_at: Utc::now(),
    };
    let err = store.commit_transition(&next, &entry).await.unwrap_err();
    assert_eq!(
        err,
        StoreError::Conflict("Driver already has a transport in progress".to_string())
    );

    // The refused transition rolled back: status and history are untouched.
    let stored = store.transport(waiting.id).await?.unwrap();
    assert_eq!(stored.status, TransportStatus::Planned);
    assert_eq!(store.history_for_transport(waiting.id).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn terminal_rows_do_not_hold_resources() -> anyhow::Result<()> {
    let url = match std::env::var(convoy_db::ENV_DB_URL) {
        Ok(v) => v,
        Err(_) => {
            eprintln!("SKIP: CONVOY_DATABASE_URL not set");
            return Ok(());
        }
    };

    let store = make_store(&url).await?;
    let seed = seed_fleet(&store).await?;

    let mut done = transport_on(&seed, seed.vehicle, Some(seed.driver));
    done.status = TransportStatus::Cancelled;
    store.insert_transport(&done, &seed_entry(&done)).await?;

    // The vehicle is free for a new ACTIVE row.
    let fresh = transport_on(&seed, seed.vehicle, None);
    store.insert_transport(&fresh, &seed_entry(&fresh)).await?;

    // But it stays referenced for delete-guard purposes.
    assert!(store.vehicle_referenced(seed.vehicle).await?);

    Ok(())
}
