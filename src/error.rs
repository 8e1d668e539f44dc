use crate::ride::RideStatus;
use crate::store::{OperationClass, StoreError};

/// Result alias used across the engine.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Engine error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An operation referenced an id that does not exist.
    #[error("{collection} record {id} not found")]
    NotFound { collection: &'static str, id: u64 },

    /// Malformed user input; shown to the user, never retried.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A status write the ride state machine forbids.
    #[error("ride cannot move from {from} to {to}")]
    InvalidTransition { from: RideStatus, to: RideStatus },

    /// Simulated backend unavailability.
    #[error("{collection} backend unavailable during {operation}")]
    Transient {
        collection: &'static str,
        operation: OperationClass,
    },

    /// Internal storage failure (lock poisoning, bad seed data).
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient { .. })
    }

    /// Validation failures and forbidden transitions: user-facing, no retry.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::InvalidTransition { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => Error::NotFound { collection, id },
            StoreError::Unavailable {
                collection,
                operation,
            } => Error::Transient {
                collection,
                operation,
            },
            other => Error::Storage(other.to_string()),
        }
    }
}

/// Input rejected before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("please enter both pickup and destination locations")]
    EmptyLocation,

    #[error("pickup and destination cannot be the same")]
    SameLocation,

    #[error("card number must have at least 16 digits")]
    CardNumberTooShort,

    #[error("card number may only contain digits, spaces and dashes")]
    CardNumberNotNumeric,

    #[error("missing required card field: {0}")]
    MissingCardField(&'static str),

    #[error("expiry date must be MM/YY")]
    InvalidExpiry,

    #[error("cvv must be 3 or 4 digits")]
    InvalidCvv,

    #[error("rating must be between 1 and 5 stars, got {0}")]
    RatingOutOfRange(u8),

    #[error("only completed rides can be rated")]
    RideNotCompleted,

    #[error("message cannot be empty")]
    EmptyMessage,
}
