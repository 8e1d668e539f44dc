use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::Location;
use crate::store::Record;

/// Ride status. Forward order is `Searching -> Assigned -> Arriving ->
/// InProgress -> Completed`; `Cancelled` is reachable from the first three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RideStatus {
    Searching,
    Assigned,
    Arriving,
    InProgress,
    Completed,
    Cancelled,
}

impl RideStatus {
    /// The forward sequence, in order.
    pub const FORWARD: [RideStatus; 5] = [
        RideStatus::Searching,
        RideStatus::Assigned,
        RideStatus::Arriving,
        RideStatus::InProgress,
        RideStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Searching => "searching",
            RideStatus::Assigned => "assigned",
            RideStatus::Arriving => "arriving",
            RideStatus::InProgress => "in-progress",
            RideStatus::Completed => "completed",
            RideStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Cancelled)
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Riders may cancel until the trip has started.
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            RideStatus::Searching | RideStatus::Assigned | RideStatus::Arriving
        )
    }

    /// The single forward successor, if any.
    pub fn next(&self) -> Option<RideStatus> {
        match self {
            RideStatus::Searching => Some(RideStatus::Assigned),
            RideStatus::Assigned => Some(RideStatus::Arriving),
            RideStatus::Arriving => Some(RideStatus::InProgress),
            RideStatus::InProgress => Some(RideStatus::Completed),
            RideStatus::Completed | RideStatus::Cancelled => None,
        }
    }

    /// One step forward, or the cancel escape from a cancellable status.
    pub fn can_transition_to(&self, to: RideStatus) -> bool {
        if to == RideStatus::Cancelled {
            return self.is_cancellable();
        }
        self.next() == Some(to)
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Amount of money in integer cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u32);

impl Money {
    pub const fn from_cents(cents: u32) -> Self {
        Money(cents)
    }

    pub fn cents(&self) -> u32 {
        self.0
    }

    pub fn dollars(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Service level; fixes the base fare bracket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideType {
    #[default]
    Standard,
    Premium,
    Carpool,
}

impl RideType {
    pub const ALL: [RideType; 3] = [RideType::Standard, RideType::Premium, RideType::Carpool];

    pub fn as_str(&self) -> &'static str {
        match self {
            RideType::Standard => "standard",
            RideType::Premium => "premium",
            RideType::Carpool => "carpool",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RideType::Standard => "SwiftRide",
            RideType::Premium => "SwiftRide Premium",
            RideType::Carpool => "SwiftPool",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RideType::Standard => "Affordable rides",
            RideType::Premium => "High-end vehicles",
            RideType::Carpool => "Share & save",
        }
    }

    pub fn base_fare(&self) -> Money {
        match self {
            RideType::Standard => Money::from_cents(1250),
            RideType::Premium => Money::from_cents(2250),
            RideType::Carpool => Money::from_cents(850),
        }
    }

    /// Advertised pickup window in minutes, (min, max).
    pub fn pickup_eta_window(&self) -> (u32, u32) {
        match self {
            RideType::Standard => (3, 5),
            RideType::Premium => (2, 4),
            RideType::Carpool => (5, 8),
        }
    }
}

impl fmt::Display for RideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which payment method pays for a ride.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentRef {
    /// Whatever the rider's default method is at charge time.
    #[default]
    Default,
    Card(u64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    pub id: u64,
    pub rider_id: String,
    pub driver_id: Option<u64>,
    pub status: RideStatus,
    pub pickup: Location,
    pub destination: Location,
    pub ride_type: RideType,
    pub fare: Money,
    pub distance_miles: f64,
    pub duration_minutes: u32,
    pub created_at: DateTime<Utc>,
    pub payment_method: PaymentRef,
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

/// Creation input. Fare, distance and duration are synthesized by the
/// repository before the draft reaches the store.
#[derive(Debug, Clone)]
pub struct RideDraft {
    pub rider_id: String,
    pub pickup: Location,
    pub destination: Location,
    pub ride_type: RideType,
    pub payment_method: PaymentRef,
    pub status: Option<RideStatus>,
    pub fare: Money,
    pub distance_miles: f64,
    pub duration_minutes: u32,
}

/// Fields of a ride that may change after creation.
///
/// Fare, distance, duration, creation time, rider and locations are fixed at
/// booking and deliberately absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RidePatch {
    pub status: Option<RideStatus>,
    pub driver_id: Option<u64>,
    pub payment_method: Option<PaymentRef>,
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

impl RidePatch {
    pub fn status(status: RideStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_driver(mut self, driver_id: u64) -> Self {
        self.driver_id = Some(driver_id);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == RidePatch::default()
    }
}

impl Record for Ride {
    const COLLECTION: &'static str = "rides";

    type Draft = RideDraft;
    type Patch = RidePatch;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: RideDraft) -> Self {
        Ride {
            id,
            rider_id: draft.rider_id,
            driver_id: None,
            status: draft.status.unwrap_or(RideStatus::Searching),
            pickup: draft.pickup,
            destination: draft.destination,
            ride_type: draft.ride_type,
            fare: draft.fare,
            distance_miles: draft.distance_miles,
            duration_minutes: draft.duration_minutes,
            created_at: Utc::now(),
            payment_method: draft.payment_method,
            rating: None,
            comment: None,
        }
    }

    fn apply(&mut self, patch: RidePatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(driver_id) = patch.driver_id {
            self.driver_id = Some(driver_id);
        }
        if let Some(payment_method) = patch.payment_method {
            self.payment_method = payment_method;
        }
        if let Some(rating) = patch.rating {
            self.rating = Some(rating);
        }
        if let Some(comment) = patch.comment {
            self.comment = Some(comment);
        }
    }
}
