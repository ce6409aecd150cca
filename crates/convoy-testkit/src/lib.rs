//! Seeded in-memory fixtures for scenario tests.
//!
//! [`FleetFixture::seed`] builds one small standard fleet on a fresh
//! `MemStore`: two ACTIVE vehicles, one ACTIVE trailer (payload 50 kg,
//! volume 60 m3), two AVAILABLE drivers with their user rows, two locations
//! and an admin user. Scenario tests layer transports on top through the
//! service under test, so every fixture id is public.

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use convoy_domain::{
    CreateCargoRequest, CreateTransportRequest, Driver, DriverStatus, FuelType, Location,
    StatusHistoryEntry, Trailer, TrailerStatus, Transport, TransportStatus, User, Vehicle,
    VehicleStatus, GRAMS_PER_KG, LITRES_PER_M3, METRES_PER_KM,
};
use convoy_store::{FleetStore, MemStore, StoreError};

/// The standard fleet, seeded and ready to allocate.
pub struct FleetFixture {
    pub store: Arc<MemStore>,
    pub admin: Uuid,
    pub driver: Uuid,
    pub second_driver: Uuid,
    pub vehicle: Uuid,
    pub second_vehicle: Uuid,
    pub trailer: Uuid,
    pub pickup: Uuid,
    pub delivery: Uuid,
}

impl FleetFixture {
    pub async fn seed() -> Result<Self, StoreError> {
        let store = Arc::new(MemStore::new());

        let admin = Uuid::new_v4();
        store
            .insert_user(&User {
                id: admin,
                display_name: "Test Admin".to_string(),
            })
            .await?;

        // Drivers are users; both rows go in so history rows can resolve
        // the acting user.
        let driver = Uuid::new_v4();
        let second_driver = Uuid::new_v4();
        for (user_id, name, license) in [
            (driver, "Jan Kowalski", "PL0441920"),
            (second_driver, "Piotr Nowak", "PL0887213"),
        ] {
            store
                .insert_user(&User {
                    id: user_id,
                    display_name: name.to_string(),
                })
                .await?;
            store
                .insert_driver(&Driver {
                    user_id,
                    license_number: license.to_string(),
                    license_category: Some("CE".to_string()),
                    license_expiry: NaiveDate::from_ymd_opt(2029, 3, 31),
                    status: DriverStatus::Available,
                })
                .await?;
        }

        let vehicle = Uuid::new_v4();
        let second_vehicle = Uuid::new_v4();
        for (id, manufacturer, model, plate) in [
            (vehicle, "Volvo", "FH16", "WGM 4102"),
            (second_vehicle, "MAN", "TGX", "WGM 7755"),
        ] {
            store
                .insert_vehicle(&Vehicle {
                    id,
                    manufacturer: manufacturer.to_string(),
                    model: model.to_string(),
                    license_plate: plate.to_string(),
                    date_of_production: NaiveDate::from_ymd_opt(2021, 9, 14),
                    mileage_km: Some(412_000),
                    fuel_type: FuelType::Diesel,
                    allowed_load_g: Some(20_000 * GRAMS_PER_KG),
                    insurance_number: Some("PZU-1002-44".to_string()),
                    status: VehicleStatus::Active,
                })
                .await?;
        }

        // Deliberately small capacity so the over-capacity scenarios can use
        // round entry-unit numbers.
        let trailer = Uuid::new_v4();
        store
            .insert_trailer(&Trailer {
                id: trailer,
                name: "curtainsider".to_string(),
                license_plate: "WGM 1290T".to_string(),
                payload_g: Some(50 * GRAMS_PER_KG),
                volume_l: Some(60 * LITRES_PER_M3),
                status: TrailerStatus::Active,
            })
            .await?;

        let pickup = Uuid::new_v4();
        let delivery = Uuid::new_v4();
        for (id, street, city, postcode) in [
            (pickup, "Magazynowa 12", "Warsaw", "00-001"),
            (delivery, "Portowa 3", "Gdansk", "80-001"),
        ] {
            store
                .insert_location(&Location {
                    id,
                    street: street.to_string(),
                    building_number: None,
                    city: city.to_string(),
                    postcode: Some(postcode.to_string()),
                    country: "Poland".to_string(),
                    latitude: None,
                    longitude: None,
                })
                .await?;
        }

        Ok(Self {
            store,
            admin,
            driver,
            second_driver,
            vehicle,
            second_vehicle,
            trailer,
            pickup,
            delivery,
        })
    }

    /// Create-request wired to the fixture's first vehicle, the trailer and
    /// both locations. No driver; assignment is its own operation.
    pub fn transport_request(&self) -> CreateTransportRequest {
        CreateTransportRequest {
            vehicle_id: Some(self.vehicle),
            trailer_id: Some(self.trailer),
            driver_id: None,
            pickup_location_id: Some(self.pickup),
            delivery_location_id: Some(self.delivery),
            contractual_due_at: None,
            planned_start_at: Some(Utc.with_ymd_and_hms(2025, 7, 1, 6, 0, 0).unwrap()),
            planned_end_at: Some(Utc.with_ymd_and_hms(2025, 7, 2, 18, 0, 0).unwrap()),
            planned_distance_m: Some(420 * METRES_PER_KM),
        }
    }

    /// Bare PLANNED transport row for direct store seeding, bypassing the
    /// service checks. Scenario setups use this to construct states the
    /// operations themselves refuse to create, such as one driver holding
    /// two transports at once.
    pub fn planned_transport(&self, vehicle_id: Uuid, driver_id: Option<Uuid>) -> Transport {
        Transport {
            id: Uuid::new_v4(),
            status: TransportStatus::Planned,
            contractual_due_at: None,
            planned_start_at: Some(Utc.with_ymd_and_hms(2025, 7, 1, 6, 0, 0).unwrap()),
            planned_end_at: None,
            actual_start_at: None,
            actual_end_at: None,
            planned_distance_m: None,
            actual_distance_m: None,
            vehicle_id,
            trailer_id: None,
            driver_id,
            pickup_location_id: self.pickup,
            delivery_location_id: self.delivery,
            created_by: self.admin,
        }
    }

    /// History row matching a directly seeded transport's current status.
    pub fn seed_entry(t: &Transport) -> StatusHistoryEntry {
        StatusHistoryEntry {
            id: Uuid::new_v4(),
            transport_id: t.id,
            status: t.status,
            changed_by: None,
            changed_at: Utc.with_ymd_and_hms(2025, 7, 1, 5, 0, 0).unwrap(),
        }
    }

    /// Cargo request in entry units (kilograms / cubic metres).
    pub fn cargo_request(weight_kg: i64, volume_m3: i64) -> CreateCargoRequest {
        CreateCargoRequest {
            description: "palletized goods".to_string(),
            weight_g: weight_kg * GRAMS_PER_KG,
            volume_l: volume_m3 * LITRES_PER_M3,
            pickup_date: None,
            delivery_date: None,
        }
    }
}
