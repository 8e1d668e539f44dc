//! Drivers - pre-seeded, read-only for riders; the lifecycle moves them
//! around and picks one for each ride.

mod fleet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::location::{Coordinate, Location};
use crate::store::{Record, RecordStore};

pub use fleet::default_fleet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub make: String,
    pub model: String,
    pub color: String,
    pub plate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: u64,
    pub name: String,
    /// Average rating, 0 to 5.
    pub rating: f64,
    pub vehicle: Vehicle,
    pub photo_url: String,
    pub location: Coordinate,
}

#[derive(Debug, Clone)]
pub struct DriverDraft {
    pub name: String,
    pub rating: f64,
    pub vehicle: Vehicle,
    pub photo_url: String,
    pub location: Coordinate,
}

/// Only the position of a driver changes in this system.
#[derive(Debug, Clone, Default)]
pub struct DriverPatch {
    pub location: Option<Coordinate>,
}

impl Record for Driver {
    const COLLECTION: &'static str = "drivers";

    type Draft = DriverDraft;
    type Patch = DriverPatch;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: DriverDraft) -> Self {
        Driver {
            id,
            name: draft.name,
            rating: draft.rating.clamp(0.0, 5.0),
            vehicle: draft.vehicle,
            photo_url: draft.photo_url,
            location: draft.location,
        }
    }

    fn apply(&mut self, patch: DriverPatch) {
        if let Some(location) = patch.location {
            self.location = location;
        }
    }
}

/// Read access to drivers plus the dispatch and movement helpers used by the
/// ride lifecycle.
#[derive(Clone)]
pub struct DriverDirectory {
    store: RecordStore<Driver>,
}

impl DriverDirectory {
    pub fn new(store: RecordStore<Driver>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RecordStore<Driver> {
        &self.store
    }

    pub async fn get_driver(&self, id: u64) -> Result<Driver> {
        Ok(self.store.get_by_id(id).await?)
    }

    pub async fn list_drivers(&self) -> Result<Vec<Driver>> {
        Ok(self.store.list_all().await?)
    }

    /// Choose a driver for a pickup: the nearest one when the pickup has a
    /// coordinate, otherwise the best rated. `None` when the fleet is empty.
    pub async fn dispatch(&self, pickup: &Location) -> Result<Option<Driver>> {
        let drivers = self.store.list_all().await?;
        let chosen = match pickup.coordinate {
            Some(target) => drivers.into_iter().min_by(|a, b| {
                a.location
                    .distance_miles(&target)
                    .total_cmp(&b.location.distance_miles(&target))
            }),
            None => drivers
                .into_iter()
                .max_by(|a, b| a.rating.total_cmp(&b.rating).then(b.id.cmp(&a.id))),
        };
        if let Some(driver) = &chosen {
            debug!(driver_id = driver.id, pickup = %pickup.address, "driver dispatched");
        }
        Ok(chosen)
    }

    /// Move a driver `fraction` of the way toward `target`.
    pub async fn move_toward(&self, driver_id: u64, target: Coordinate, fraction: f64) -> Result<Driver> {
        self.store
            .modify(driver_id, |driver| {
                driver.location = driver.location.toward(&target, fraction);
                Ok(())
            })
            .await
    }
}
