//! RideRepository - the ride record store plus booking-time synthesis and
//! the transition guard every status write goes through.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::booking::BookingRequest;
use super::model::{Money, Ride, RideDraft, RidePatch, RideStatus, RideType};
use crate::error::{Error, Result, ValidationError};
use crate::store::{Record, RecordStore};

/// Maximum fare variance either side of the base fare, in cents.
const FARE_VARIANCE_CENTS: i64 = 500;
/// Fares never drop below a dollar, whatever the variance.
const MIN_FARE_CENTS: i64 = 100;

/// Trip estimates synthesized at booking time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripQuote {
    pub fare: Money,
    pub distance_miles: f64,
    pub duration_minutes: u32,
}

#[derive(Clone)]
pub struct RideRepository {
    store: RecordStore<Ride>,
    rng: Arc<Mutex<StdRng>>,
}

impl RideRepository {
    pub fn new(store: RecordStore<Ride>) -> Self {
        Self {
            store,
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    /// Fix the RNG behind fares, distances and durations.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    pub fn store(&self) -> &RecordStore<Ride> {
        &self.store
    }

    /// Validate the booking, quote it and persist a new `searching` ride.
    ///
    /// Validation happens before the store is touched, so a rejected booking
    /// never consumes an id.
    pub async fn create(&self, request: BookingRequest) -> Result<Ride> {
        request.validate()?;
        let quote = self.quote(request.ride_type)?;
        let draft = RideDraft {
            rider_id: request.rider_id,
            pickup: request.pickup,
            destination: request.destination,
            ride_type: request.ride_type,
            payment_method: request.payment_method,
            status: None,
            fare: quote.fare,
            distance_miles: quote.distance_miles,
            duration_minutes: quote.duration_minutes,
        };
        let ride = self.store.create(draft).await?;
        debug!(ride_id = ride.id, fare = %ride.fare, "ride created");
        Ok(ride)
    }

    pub async fn get(&self, id: u64) -> Result<Ride> {
        Ok(self.store.get_by_id(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<Ride>> {
        Ok(self.store.list_all().await?)
    }

    pub async fn find<F>(&self, predicate: F) -> Result<Vec<Ride>>
    where
        F: Fn(&Ride) -> bool,
    {
        Ok(self.store.find(predicate).await?)
    }

    /// Apply a patch after checking it against the ride as currently stored.
    ///
    /// The check and the write happen under the same store lock, so a write
    /// computed from a stale snapshot (a lifecycle tick racing a cancel, for
    /// instance) is rejected instead of resurrecting the ride.
    pub async fn update(&self, id: u64, patch: RidePatch) -> Result<Ride> {
        self.store
            .modify(id, |ride| {
                validate_patch(ride, &patch)?;
                ride.apply(patch);
                Ok::<_, Error>(())
            })
            .await
    }

    /// Persist a status change, optionally recording the assigned driver.
    pub async fn transition(&self, id: u64, to: RideStatus, driver_id: Option<u64>) -> Result<Ride> {
        let mut patch = RidePatch::status(to);
        patch.driver_id = driver_id;
        self.update(id, patch).await
    }

    /// Move a ride forward along the chain until it reaches `to`.
    ///
    /// Used by the lifecycle, whose persisted status can lag behind its
    /// local one after a failed write. Still never leaves a terminal status
    /// and never moves backwards.
    pub async fn advance_to(&self, id: u64, to: RideStatus, driver_id: Option<u64>) -> Result<Ride> {
        self.store
            .modify(id, |ride| {
                let from = ride.status;
                let mut current = from;
                while current != to {
                    current = current.next().ok_or(Error::InvalidTransition { from, to })?;
                }
                ride.status = to;
                if driver_id.is_some() {
                    ride.driver_id = driver_id;
                }
                Ok::<_, Error>(())
            })
            .await
    }

    pub async fn cancel(&self, id: u64) -> Result<Ride> {
        self.transition(id, RideStatus::Cancelled, None).await
    }

    /// Record the rider's rating; only completed rides can be rated and the
    /// status stays `completed`.
    pub async fn rate(&self, id: u64, rating: u8, comment: Option<String>) -> Result<Ride> {
        validate_rating(rating)?;
        let comment = comment
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        self.store
            .modify(id, |ride| {
                if ride.status != RideStatus::Completed {
                    return Err(ValidationError::RideNotCompleted.into());
                }
                ride.rating = Some(rating);
                ride.comment = comment;
                Ok::<_, Error>(())
            })
            .await
    }

    /// Fare from the type's base plus uniform variance, distance and
    /// duration drawn from the demo's ranges.
    pub fn quote(&self, ride_type: RideType) -> Result<TripQuote> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| Error::Storage("fare rng lock poisoned".into()))?;

        let variance = rng.gen_range(-FARE_VARIANCE_CENTS..FARE_VARIANCE_CENTS);
        let cents = (i64::from(ride_type.base_fare().cents()) + variance).max(MIN_FARE_CENTS);
        let distance_tenths: u32 = rng.gen_range(20..170);
        let duration_minutes = rng.gen_range(15..45);

        Ok(TripQuote {
            fare: Money::from_cents(cents as u32),
            distance_miles: f64::from(distance_tenths) / 10.0,
            duration_minutes,
        })
    }
}

fn validate_rating(rating: u8) -> Result<()> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(ValidationError::RatingOutOfRange(rating).into())
    }
}

fn validate_patch(current: &Ride, patch: &RidePatch) -> Result<()> {
    let target = patch.status.unwrap_or(current.status);
    if target != current.status && !current.status.can_transition_to(target) {
        return Err(Error::InvalidTransition {
            from: current.status,
            to: target,
        });
    }

    if let Some(rating) = patch.rating {
        validate_rating(rating)?;
    }
    if (patch.rating.is_some() || patch.comment.is_some()) && target != RideStatus::Completed {
        return Err(ValidationError::RideNotCompleted.into());
    }

    Ok(())
}
