//! Shared data model for the convoy fleet engine.
//!
//! Entities reference each other by id only; there is no in-memory object
//! graph. Whoever needs a referenced entity loads it explicitly through the
//! store. All business quantities are integers in base units (grams, litres,
//! metres) so capacity sums stay exact.

pub mod entity;
pub mod request;
pub mod status;

pub use entity::{
    Cargo, Driver, Location, StatusHistoryEntry, Trailer, Transport, User, Vehicle,
};
pub use request::{CreateCargoRequest, CreateTransportRequest, UpdateCargoRequest};
pub use status::{DriverStatus, FuelType, TrailerStatus, TransportStatus, VehicleStatus};

/// Grams per kilogram: cargo weight and trailer payload scale.
pub const GRAMS_PER_KG: i64 = 1_000;
/// Litres per cubic metre: cargo volume and trailer volume scale.
pub const LITRES_PER_M3: i64 = 1_000;
/// Metres per kilometre: transport distance scale.
pub const METRES_PER_KM: i64 = 1_000;
