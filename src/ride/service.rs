//! RideService - the booking, tracking, history and rating flows.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{error, info};

use super::booking::BookingRequest;
use super::model::{Ride, RidePatch};
use super::repository::RideRepository;
use crate::driver::DriverDirectory;
use crate::error::{Error, Result};
use crate::lifecycle::{LifecycleDeps, LifecycleEvents, LifecycleSimulator, MIN_TICK_INTERVAL};

/// Default time between lifecycle steps.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(8000);

type Trackers = HashMap<u64, Arc<LifecycleSimulator>>;

/// Clone-friendly via Arc: clones share the tracked rides. Dropping the last
/// clone stops every simulator it started.
#[derive(Clone)]
pub struct RideService {
    rides: RideRepository,
    drivers: DriverDirectory,
    tick_interval: Duration,
    trackers: Arc<Mutex<Trackers>>,
}

impl RideService {
    pub fn new(rides: RideRepository, drivers: DriverDirectory) -> Self {
        Self {
            rides,
            drivers,
            tick_interval: DEFAULT_TICK_INTERVAL,
            trackers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// A zero interval is raised to [`MIN_TICK_INTERVAL`].
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval.max(MIN_TICK_INTERVAL);
        self
    }

    pub fn rides(&self) -> &RideRepository {
        &self.rides
    }

    pub fn drivers(&self) -> &DriverDirectory {
        &self.drivers
    }

    pub async fn create_ride(&self, request: BookingRequest) -> Result<Ride> {
        let ride = self.rides.create(request).await?;
        info!(
            ride_id = ride.id,
            rider_id = %ride.rider_id,
            ride_type = %ride.ride_type,
            fare = %ride.fare,
            "ride booked"
        );
        Ok(ride)
    }

    pub async fn get_ride(&self, id: u64) -> Result<Ride> {
        self.rides.get(id).await.inspect_err(|err| {
            if err.is_not_found() {
                error!(ride_id = id, "ride not found");
            }
        })
    }

    pub async fn list_rides(&self) -> Result<Vec<Ride>> {
        self.rides.list().await
    }

    pub async fn update_ride(&self, id: u64, patch: RidePatch) -> Result<Ride> {
        self.rides.update(id, patch).await
    }

    /// Cancel a ride. A tracked ride is cancelled through its simulator,
    /// whose local status decides; the store is only asked for rides
    /// nobody tracks.
    pub async fn cancel_ride(&self, id: u64) -> Result<Ride> {
        if let Some(tracker) = self.tracker(id)? {
            return tracker.cancel().await;
        }
        let ride = self.rides.cancel(id).await?;
        info!(ride_id = id, "ride cancelled");
        Ok(ride)
    }

    /// The simulator for `ride`, started on first use.
    ///
    /// Simulators are registered with this service and live as long as it
    /// does, so later calls, [`RideService::subscribe`] and
    /// [`RideService::cancel_ride`] all share one per ride.
    pub fn track(&self, ride: Ride) -> Result<Arc<LifecycleSimulator>> {
        let mut trackers = self.lock_trackers()?;
        let tracker = trackers
            .entry(ride.id)
            .or_insert_with(|| Arc::new(LifecycleSimulator::start(ride, self.deps(), self.tick_interval)));
        Ok(Arc::clone(tracker))
    }

    /// Follow a ride's lifecycle, starting its simulator on first use.
    pub async fn subscribe(&self, ride_id: u64) -> Result<LifecycleEvents> {
        if let Some(tracker) = self.tracker(ride_id)? {
            return Ok(tracker.subscribe());
        }
        let ride = self.get_ride(ride_id).await?;
        Ok(self.track(ride)?.subscribe())
    }

    /// Rate a completed ride from 1 to 5 stars.
    pub async fn rate_ride(&self, id: u64, rating: u8, comment: Option<String>) -> Result<Ride> {
        let ride = self.rides.rate(id, rating, comment).await?;
        info!(ride_id = id, rating, "ride rated");
        Ok(ride)
    }

    /// A rider's rides, most recent first.
    pub async fn history(&self, rider_id: &str) -> Result<Vec<Ride>> {
        let mut rides = self.rides.find(|ride| ride.rider_id == rider_id).await?;
        rides.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rides)
    }

    /// The rider's most recent ride that is not over yet.
    pub async fn active_ride(&self, rider_id: &str) -> Result<Option<Ride>> {
        Ok(self
            .history(rider_id)
            .await?
            .into_iter()
            .find(|ride| ride.status.is_active()))
    }

    /// A booking for the same trip as a past ride.
    pub async fn rebook(&self, ride_id: u64) -> Result<BookingRequest> {
        let ride = self.get_ride(ride_id).await?;
        Ok(BookingRequest::rebook(&ride))
    }

    fn deps(&self) -> LifecycleDeps {
        LifecycleDeps {
            rides: self.rides.clone(),
            drivers: self.drivers.clone(),
        }
    }

    fn tracker(&self, ride_id: u64) -> Result<Option<Arc<LifecycleSimulator>>> {
        Ok(self.lock_trackers()?.get(&ride_id).cloned())
    }

    fn lock_trackers(&self) -> Result<MutexGuard<'_, Trackers>> {
        self.trackers
            .lock()
            .map_err(|_| Error::Storage("ride trackers lock poisoned".into()))
    }
}
