//! Operation inputs accepted by the allocation service.
//!
//! The same transport request shape serves create and update, as the update
//! operation re-validates every field it applies. `driver_id` is honoured on
//! create only; updates never touch the driver (assignment has its own
//! operation).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTransportRequest {
    pub vehicle_id: Option<Uuid>,
    pub trailer_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub pickup_location_id: Option<Uuid>,
    pub delivery_location_id: Option<Uuid>,
    pub contractual_due_at: Option<DateTime<Utc>>,
    pub planned_start_at: Option<DateTime<Utc>>,
    pub planned_end_at: Option<DateTime<Utc>>,
    pub planned_distance_m: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCargoRequest {
    pub description: String,
    pub weight_g: i64,
    pub volume_l: i64,
    pub pickup_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,
}

/// Partial cargo edit; only supplied fields are validated and applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCargoRequest {
    pub description: Option<String>,
    pub weight_g: Option<i64>,
    pub volume_l: Option<i64>,
    pub pickup_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,
}
