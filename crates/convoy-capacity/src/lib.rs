//! Cargo capacity validation (pure, no IO).
//!
//! Responsibilities:
//! - Check a candidate cargo weight/volume against the owning transport's
//!   trailer capacity, summing what is already loaded.
//! - During an edit, exclude the cargo being edited from the sum so it does
//!   not count against itself.
//! - Check the pickup/delivery date pair.
//!
//! All quantities are integers in base units (grams, litres); sums use
//! checked arithmetic and refuse to wrap.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use convoy_domain::Cargo;

// ---------------------------------------------------------------------------
// CapacityError
// ---------------------------------------------------------------------------

/// Why a cargo value was refused. Display strings are the user-facing rule
/// messages; capacities are reported in the unit the caller entered them in
/// (kilograms, cubic metres).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapacityError {
    /// Candidate weight ≤ 0.
    NonPositiveWeight,
    /// Candidate volume ≤ 0.
    NonPositiveVolume,
    /// Transport has no trailer, or the trailer has no payload capacity.
    NoTrailerPayload,
    /// Transport has no trailer, or the trailer has no volume capacity.
    NoTrailerVolume,
    /// Existing weight plus candidate exceeds the trailer payload.
    PayloadExceeded { payload_g: i64 },
    /// Existing volume plus candidate exceeds the trailer volume.
    VolumeExceeded { volume_l: i64 },
    /// Weight sum overflowed i64.
    WeightOverflow,
    /// Volume sum overflowed i64.
    VolumeOverflow,
    /// Delivery date is before the pickup date.
    DeliveryBeforePickup,
}

impl std::fmt::Display for CapacityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveWeight => f.write_str("Cargo weight must be positive"),
            Self::NonPositiveVolume => f.write_str("Cargo volume must be positive"),
            Self::NoTrailerPayload => {
                f.write_str("Transport has no trailer payload to validate cargo weight")
            }
            Self::NoTrailerVolume => {
                f.write_str("Transport has no trailer volume to validate cargo volume")
            }
            Self::PayloadExceeded { payload_g } => write!(
                f,
                "Cargo weight exceeds trailer payload ({} kg)",
                *payload_g as f64 / convoy_domain::GRAMS_PER_KG as f64
            ),
            Self::VolumeExceeded { volume_l } => write!(
                f,
                "Cargo volume exceeds trailer volume ({} m3)",
                *volume_l as f64 / convoy_domain::LITRES_PER_M3 as f64
            ),
            Self::WeightOverflow => f.write_str("weight overflow"),
            Self::VolumeOverflow => f.write_str("volume overflow"),
            Self::DeliveryBeforePickup => {
                f.write_str("Delivery date must be after pickup date")
            }
        }
    }
}

impl std::error::Error for CapacityError {}

impl CapacityError {
    /// Malformed-input errors, as opposed to violated business rules.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NonPositiveWeight
                | Self::NonPositiveVolume
                | Self::WeightOverflow
                | Self::VolumeOverflow
        )
    }
}

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------

/// Validate a candidate weight against the trailer payload.
///
/// `payload_g` is the trailer's payload capacity; `None` when the transport
/// has no trailer or the trailer has no recorded payload. `exclude_cargo`
/// names a cargo id left out of the existing sum (the row being edited).
pub fn validate_weight(
    payload_g: Option<i64>,
    existing: &[Cargo],
    exclude_cargo: Option<Uuid>,
    candidate_g: i64,
) -> Result<(), CapacityError> {
    if candidate_g <= 0 {
        return Err(CapacityError::NonPositiveWeight);
    }
    let payload_g = payload_g.ok_or(CapacityError::NoTrailerPayload)?;

    let mut total = candidate_g;
    for c in existing {
        if Some(c.id) == exclude_cargo {
            continue;
        }
        total = total
            .checked_add(c.weight_g)
            .ok_or(CapacityError::WeightOverflow)?;
    }

    if total > payload_g {
        return Err(CapacityError::PayloadExceeded { payload_g });
    }
    Ok(())
}

/// Validate a candidate volume against the trailer volume. Same shape as
/// [`validate_weight`].
pub fn validate_volume(
    volume_l: Option<i64>,
    existing: &[Cargo],
    exclude_cargo: Option<Uuid>,
    candidate_l: i64,
) -> Result<(), CapacityError> {
    if candidate_l <= 0 {
        return Err(CapacityError::NonPositiveVolume);
    }
    let volume_l = volume_l.ok_or(CapacityError::NoTrailerVolume)?;

    let mut total = candidate_l;
    for c in existing {
        if Some(c.id) == exclude_cargo {
            continue;
        }
        total = total
            .checked_add(c.volume_l)
            .ok_or(CapacityError::VolumeOverflow)?;
    }

    if total > volume_l {
        return Err(CapacityError::VolumeExceeded { volume_l });
    }
    Ok(())
}

/// Delivery must not precede pickup; either side may be absent.
pub fn validate_cargo_dates(
    pickup: Option<DateTime<Utc>>,
    delivery: Option<DateTime<Utc>>,
) -> Result<(), CapacityError> {
    if let (Some(p), Some(d)) = (pickup, delivery) {
        if d < p {
            return Err(CapacityError::DeliveryBeforePickup);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
