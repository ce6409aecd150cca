//! Status enums for transports and fleet resources.
//!
//! Wire and storage both use the SCREAMING_SNAKE_CASE names, so every enum
//! here carries `as_str` / `FromStr` alongside its serde derive.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TransportStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportStatus {
    /// Created, editable, resources reserved but the job has not started.
    Planned,
    /// The assigned driver has accepted the job.
    Accepted,
    /// The driver is on the road.
    InProgress,
    /// Delivered. **Terminal.**
    Finished,
    /// Called off by staff. **Terminal.**
    Cancelled,
    /// Attempted but unsuccessful. **Terminal.**
    Failed,
    /// Turned down before execution. **Terminal.**
    Rejected,
}

impl TransportStatus {
    /// Returns `true` if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Finished | Self::Cancelled | Self::Failed | Self::Rejected
        )
    }

    /// Active = the transport still holds its resources exclusively.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Planned | Self::Accepted | Self::InProgress)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "PLANNED",
            Self::Accepted => "ACCEPTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Finished => "FINISHED",
            Self::Cancelled => "CANCELLED",
            Self::Failed => "FAILED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for TransportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransportStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLANNED" => Ok(Self::Planned),
            "ACCEPTED" => Ok(Self::Accepted),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "FINISHED" => Ok(Self::Finished),
            "CANCELLED" => Ok(Self::Cancelled),
            "FAILED" => Ok(Self::Failed),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(UnknownStatus {
                kind: "transport",
                value: other.to_string(),
            }),
        }
    }
}

/// A status string that does not name any enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus {
    pub kind: &'static str,
    pub value: String,
}

impl std::fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} status: {}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownStatus {}

// ---------------------------------------------------------------------------
// Resource statuses
// ---------------------------------------------------------------------------

/// Own status of a vehicle, independent of transport assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    Active,
    InService,
    Inactive,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::InService => "IN_SERVICE",
            Self::Inactive => "INACTIVE",
        }
    }
}

impl std::str::FromStr for VehicleStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "IN_SERVICE" => Ok(Self::InService),
            "INACTIVE" => Ok(Self::Inactive),
            other => Err(UnknownStatus {
                kind: "vehicle",
                value: other.to_string(),
            }),
        }
    }
}

/// Own status of a trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrailerStatus {
    Active,
    InService,
    Inactive,
}

impl TrailerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::InService => "IN_SERVICE",
            Self::Inactive => "INACTIVE",
        }
    }
}

impl std::str::FromStr for TrailerStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "IN_SERVICE" => Ok(Self::InService),
            "INACTIVE" => Ok(Self::Inactive),
            other => Err(UnknownStatus {
                kind: "trailer",
                value: other.to_string(),
            }),
        }
    }
}

/// Own status of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriverStatus {
    Available,
    OnTransport,
    Unavailable,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::OnTransport => "ON_TRANSPORT",
            Self::Unavailable => "UNAVAILABLE",
        }
    }
}

impl std::str::FromStr for DriverStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(Self::Available),
            "ON_TRANSPORT" => Ok(Self::OnTransport),
            "UNAVAILABLE" => Ok(Self::Unavailable),
            other => Err(UnknownStatus {
                kind: "driver",
                value: other.to_string(),
            }),
        }
    }
}

/// Vehicle fuel type. Descriptive only; no business rule reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FuelType {
    Diesel,
    Petrol,
    Electric,
    Hybrid,
}

impl FuelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diesel => "DIESEL",
            Self::Petrol => "PETROL",
            Self::Electric => "ELECTRIC",
            Self::Hybrid => "HYBRID",
        }
    }
}

impl std::str::FromStr for FuelType {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DIESEL" => Ok(Self::Diesel),
            "PETROL" => Ok(Self::Petrol),
            "ELECTRIC" => Ok(Self::Electric),
            "HYBRID" => Ok(Self::Hybrid),
            other => Err(UnknownStatus {
                kind: "fuel",
                value: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
