//! The error taxonomy operations surface, and the conversions that fold
//! the layer errors into it.

use uuid::Uuid;

use convoy_capacity::CapacityError;
use convoy_lifecycle::TransitionError;
use convoy_registry::RegistryError;
use convoy_store::StoreError;

/// Operation outcome taxonomy. Everything a caller can act on is one of the
/// first three kinds; `Backend` is an infrastructure failure with no
/// business meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// An id did not resolve. `entity` is the user-facing noun.
    NotFound { entity: &'static str, id: Uuid },
    /// A business rule refused the operation. The message names the rule.
    BusinessRule(String),
    /// Malformed input, rejected before touching storage.
    Validation(String),
    /// The store failed; nothing about the request was wrong.
    Backend(String),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::BusinessRule(msg) | Self::Validation(msg) => f.write_str(msg),
            Self::Backend(msg) => write!(f, "store backend error: {msg}"),
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<StoreError> for DispatchError {
    fn from(e: StoreError) -> Self {
        match e {
            // Guard conflicts carry the rule text already.
            StoreError::Conflict(msg) => Self::BusinessRule(msg),
            StoreError::MissingRow { entity, id } => Self::NotFound { entity, id },
            StoreError::Backend(msg) => Self::Backend(msg),
        }
    }
}

impl From<RegistryError> for DispatchError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::NotFound { entity, id } => Self::NotFound { entity, id },
            RegistryError::Store(inner) => inner.into(),
        }
    }
}

impl From<TransitionError> for DispatchError {
    fn from(e: TransitionError) -> Self {
        Self::BusinessRule(e.to_string())
    }
}

impl From<CapacityError> for DispatchError {
    fn from(e: CapacityError) -> Self {
        if e.is_validation() {
            Self::Validation(e.to_string())
        } else {
            Self::BusinessRule(e.to_string())
        }
    }
}

pub(crate) fn rule(msg: impl Into<String>) -> DispatchError {
    DispatchError::BusinessRule(msg.into())
}

pub(crate) fn invalid(msg: impl Into<String>) -> DispatchError {
    DispatchError::Validation(msg.into())
}

pub(crate) fn not_found(entity: &'static str, id: Uuid) -> DispatchError {
    DispatchError::NotFound { entity, id }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_conflict_becomes_business_rule_with_same_text() {
        let e: DispatchError =
            StoreError::Conflict("Driver already has a transport in progress".to_string()).into();
        assert_eq!(
            e,
            DispatchError::BusinessRule("Driver already has a transport in progress".to_string())
        );
        assert_eq!(e.to_string(), "Driver already has a transport in progress");
    }

    #[test]
    fn capacity_errors_split_between_validation_and_rule() {
        let e: DispatchError = CapacityError::NonPositiveWeight.into();
        assert!(matches!(e, DispatchError::Validation(_)));
        assert_eq!(e.to_string(), "Cargo weight must be positive");

        let e: DispatchError = CapacityError::PayloadExceeded { payload_g: 50_000 }.into();
        assert!(matches!(e, DispatchError::BusinessRule(_)));
        assert_eq!(e.to_string(), "Cargo weight exceeds trailer payload (50 kg)");
    }

    #[test]
    fn not_found_display_names_the_entity() {
        let id = Uuid::from_u128(7);
        assert_eq!(
            not_found("Pickup location", id).to_string(),
            format!("Pickup location not found: {id}")
        );
        assert_eq!(
            not_found("User id", id).to_string(),
            format!("User id not found: {id}")
        );
    }

    #[test]
    fn transition_errors_fold_into_business_rules() {
        let e: DispatchError = TransitionError::NotAssignedToDriver.into();
        assert_eq!(
            e,
            DispatchError::BusinessRule("Transport not assigned to this driver".to_string())
        );
    }
}
