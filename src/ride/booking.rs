use serde::{Deserialize, Serialize};

use super::model::{PaymentRef, Ride, RideType};
use crate::error::ValidationError;
use crate::location::Location;

/// What the booking form submits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub rider_id: String,
    pub pickup: Location,
    pub destination: Location,
    #[serde(default)]
    pub ride_type: RideType,
    #[serde(default)]
    pub payment_method: PaymentRef,
}

impl BookingRequest {
    pub fn new(
        rider_id: impl Into<String>,
        pickup: impl Into<Location>,
        destination: impl Into<Location>,
    ) -> Self {
        Self {
            rider_id: rider_id.into(),
            pickup: pickup.into(),
            destination: destination.into(),
            ride_type: RideType::default(),
            payment_method: PaymentRef::default(),
        }
    }

    pub fn ride_type(mut self, ride_type: RideType) -> Self {
        self.ride_type = ride_type;
        self
    }

    pub fn payment(mut self, payment_method: PaymentRef) -> Self {
        self.payment_method = payment_method;
        self
    }

    /// Same trip again: pickup, destination and ride type of a past ride.
    pub fn rebook(ride: &Ride) -> Self {
        Self {
            rider_id: ride.rider_id.clone(),
            pickup: ride.pickup.clone(),
            destination: ride.destination.clone(),
            ride_type: ride.ride_type,
            payment_method: ride.payment_method,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.pickup.is_blank() || self.destination.is_blank() {
            return Err(ValidationError::EmptyLocation);
        }
        if self.pickup.address.trim() == self.destination.address.trim() {
            return Err(ValidationError::SameLocation);
        }
        Ok(())
    }
}
