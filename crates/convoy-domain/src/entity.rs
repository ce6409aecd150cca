//! Persisted entities. References between entities are plain ids.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::{
    DriverStatus, FuelType, TrailerStatus, TransportStatus, VehicleStatus,
};

/// A single haulage job binding vehicle, trailer, driver and cargo together.
///
/// Owned collections (cargo, status history) are not embedded; they are
/// loaded by transport id when an operation needs them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transport {
    pub id: Uuid,
    pub status: TransportStatus,
    pub contractual_due_at: Option<DateTime<Utc>>,
    pub planned_start_at: Option<DateTime<Utc>>,
    pub planned_end_at: Option<DateTime<Utc>>,
    /// Set exactly once, on first entry into IN_PROGRESS.
    pub actual_start_at: Option<DateTime<Utc>>,
    /// Set exactly once, on first entry into a terminal state.
    pub actual_end_at: Option<DateTime<Utc>>,
    pub planned_distance_m: Option<i64>,
    pub actual_distance_m: Option<i64>,
    pub vehicle_id: Uuid,
    pub trailer_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub pickup_location_id: Uuid,
    pub delivery_location_id: Uuid,
    pub created_by: Uuid,
}

/// One shipment item on a transport, consuming trailer capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cargo {
    pub id: Uuid,
    pub transport_id: Uuid,
    pub description: String,
    /// Weight in grams; always > 0.
    pub weight_g: i64,
    /// Volume in litres; always > 0.
    pub volume_l: i64,
    pub pickup_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,
}

/// Append-only record of one status transition. Never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: Uuid,
    pub transport_id: Uuid,
    pub status: TransportStatus,
    /// Acting user, when the transition had one.
    pub changed_by: Option<Uuid>,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub manufacturer: String,
    pub model: String,
    pub license_plate: String,
    pub date_of_production: Option<NaiveDate>,
    pub mileage_km: Option<i64>,
    pub fuel_type: FuelType,
    /// Maximum load in grams, when known.
    pub allowed_load_g: Option<i64>,
    pub insurance_number: Option<String>,
    pub status: VehicleStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trailer {
    pub id: Uuid,
    pub name: String,
    pub license_plate: String,
    /// Payload capacity in grams; null means "never validated against".
    pub payload_g: Option<i64>,
    /// Volume capacity in litres; null means "never validated against".
    pub volume_l: Option<i64>,
    pub status: TrailerStatus,
}

/// A driver is a user with haulage credentials; its id IS the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub user_id: Uuid,
    pub license_number: String,
    pub license_category: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    pub status: DriverStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub street: String,
    pub building_number: Option<String>,
    pub city: String,
    pub postcode: Option<String>,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub display_name: String,
}
