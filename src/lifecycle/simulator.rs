//! LifecycleSimulator - drives one ride through its statuses on a timer.
//!
//! The simulator owns a tokio task that ticks every `tick_interval`. Each
//! tick (or an explicit [`LifecycleSimulator::advance`]) runs the side
//! effects of the next status (dispatch, driver movement, persistence),
//! then moves the local ride forward and notifies subscribers. A step and a
//! cancel never overlap. Dropping the simulator cancels the task.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{broadcast, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::events::{EventKind, LifecycleEvent, LifecycleEvents};
use super::machine::{message_for, RideMachine};
use crate::driver::DriverDirectory;
use crate::error::{Error, Result};
use crate::ride::{Ride, RideRepository, RideStatus};

const EVENT_CAPACITY: usize = 32;
const WARNING_MESSAGE: &str = "Could not sync ride status";

/// Shortest period a ticker runs at; a zero interval is raised to this.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Collaborators the simulator persists through.
#[derive(Clone)]
pub struct LifecycleDeps {
    pub rides: RideRepository,
    pub drivers: DriverDirectory,
}

#[derive(Default)]
struct Synced {
    assigned: Option<u64>,
    failures: Vec<Error>,
}

struct Shared {
    machine: Mutex<RideMachine>,
    /// Held for a whole step or cancel, so the two never interleave.
    step: AsyncMutex<()>,
    events: broadcast::Sender<LifecycleEvent>,
    deps: LifecycleDeps,
    stop: CancellationToken,
}

impl Shared {
    fn machine(&self) -> MutexGuard<'_, RideMachine> {
        // Every mutation is a single assignment, a poisoned guard is still consistent.
        self.machine
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, machine: &RideMachine, kind: EventKind, message: impl Into<String>) {
        let event = LifecycleEvent {
            ride_id: machine.ride().id,
            status: machine.status(),
            eta_minutes: machine.eta_minutes(),
            message: message.into(),
            kind,
        };
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// One step forward. The stored ride is written before anyone hears of
    /// the new status, so a cancellation made in the store wins over the
    /// tick instead of racing it.
    async fn advance(&self) -> Result<RideStatus> {
        let _step = self.step.lock().await;
        let (ride, to) = {
            let machine = self.machine();
            (machine.ride().clone(), machine.next_status()?)
        };

        let synced = match self.sync(&ride, to).await {
            Ok(synced) => synced,
            Err(rejected) => {
                debug!(ride_id = ride.id, status = %to, "stored ride already cancelled");
                self.adopt_cancellation();
                return Err(rejected);
            }
        };

        {
            let mut machine = self.machine();
            machine.advance()?;
            if let Some(driver_id) = synced.assigned {
                machine.assign_driver(driver_id);
            }
            let kind = if to == RideStatus::Completed {
                EventKind::Completed(Box::new(machine.ride().clone()))
            } else {
                EventKind::Transition
            };
            self.emit(&machine, kind, message_for(to));
            for err in synced.failures {
                warn!(ride_id = ride.id, status = %to, error = %err, "lifecycle side effect failed");
                self.emit(&machine, EventKind::Warning(err.to_string()), WARNING_MESSAGE);
            }
        }
        if to.is_terminal() {
            self.stop.cancel();
        }
        info!(ride_id = ride.id, status = %to, "ride advanced");
        Ok(to)
    }

    /// Side effects of entering `to`, ending with the guarded status write.
    ///
    /// Only a write rejected because the stored ride is cancelled is an
    /// error; every other failure is collected and the step still happens.
    async fn sync(&self, ride: &Ride, to: RideStatus) -> Result<Synced> {
        let mut synced = Synced::default();
        match to {
            RideStatus::Assigned => match self.deps.drivers.dispatch(&ride.pickup).await {
                Ok(Some(driver)) => synced.assigned = Some(driver.id),
                Ok(None) => warn!(ride_id = ride.id, "no drivers available"),
                Err(err) => synced.failures.push(err),
            },
            RideStatus::Arriving | RideStatus::InProgress => {
                if let (Some(driver), Some(pickup)) = (ride.driver_id, ride.pickup.coordinate) {
                    let fraction = if to == RideStatus::Arriving { 0.5 } else { 1.0 };
                    if let Err(err) = self.deps.drivers.move_toward(driver, pickup, fraction).await {
                        synced.failures.push(err);
                    }
                }
            }
            _ => {}
        }

        let driver_id = synced.assigned.or(ride.driver_id);
        match self.deps.rides.advance_to(ride.id, to, driver_id).await {
            Ok(_) => {}
            Err(
                err @ Error::InvalidTransition {
                    from: RideStatus::Cancelled,
                    ..
                },
            ) => return Err(err),
            Err(err) => synced.failures.push(err),
        }
        Ok(synced)
    }

    /// The stored ride was cancelled behind the simulator's back.
    fn adopt_cancellation(&self) {
        let mut machine = self.machine();
        match machine.cancel() {
            Ok(()) => {
                self.stop.cancel();
                self.emit(&machine, EventKind::Cancelled, message_for(RideStatus::Cancelled));
            }
            Err(err) => {
                warn!(ride_id = machine.ride().id, error = %err, "stored ride cancelled after the trip started");
                self.emit(&machine, EventKind::Warning(err.to_string()), WARNING_MESSAGE);
            }
        }
    }
}

/// Handle to one tracked ride.
pub struct LifecycleSimulator {
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
}

impl LifecycleSimulator {
    /// Start tracking `ride` from its current status. Rides that are already
    /// terminal get no timer.
    pub fn start(ride: Ride, deps: LifecycleDeps, tick_interval: Duration) -> Self {
        let tick_interval = tick_interval.max(MIN_TICK_INTERVAL);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let terminal = ride.status.is_terminal();
        let ride_id = ride.id;
        let shared = Arc::new(Shared {
            machine: Mutex::new(RideMachine::new(ride)),
            step: AsyncMutex::new(()),
            events,
            deps,
            stop: CancellationToken::new(),
        });

        let task = if terminal {
            shared.stop.cancel();
            None
        } else {
            Some(spawn_ticker(Arc::clone(&shared), tick_interval))
        };
        debug!(ride_id, ?tick_interval, terminal, "lifecycle started");

        Self { shared, task }
    }

    pub fn ride_id(&self) -> u64 {
        self.shared.machine().ride().id
    }

    /// Move exactly one status forward, without waiting for the timer.
    pub async fn advance(&self) -> Result<RideStatus> {
        self.shared.advance().await
    }

    /// Stop the timer, cancel locally, then persist the cancellation.
    ///
    /// When persisting fails the local ride stays cancelled and the error is
    /// returned so the caller can retry through the ride service.
    pub async fn cancel(&self) -> Result<Ride> {
        let _step = self.shared.step.lock().await;
        let ride_id = {
            let mut machine = self.shared.machine();
            machine.cancel()?;
            self.shared.stop.cancel();
            self.shared
                .emit(&machine, EventKind::Cancelled, message_for(RideStatus::Cancelled));
            machine.ride().id
        };
        info!(ride_id, "ride cancelled");
        self.shared.deps.rides.cancel(ride_id).await
    }

    /// Events from now on. Ends right away for a ride that is already over.
    pub fn subscribe(&self) -> LifecycleEvents {
        // Subscribing under the state lock means no event slips in between.
        let machine = self.shared.machine();
        let rx = self.shared.events.subscribe();
        if machine.is_terminal() {
            LifecycleEvents::finished(rx)
        } else {
            LifecycleEvents::new(rx)
        }
    }

    pub fn snapshot(&self) -> Ride {
        self.shared.machine().ride().clone()
    }

    pub fn status(&self) -> RideStatus {
        self.shared.machine().status()
    }

    pub fn eta_minutes(&self) -> u32 {
        self.shared.machine().eta_minutes()
    }

    /// Whether the timer task is still alive.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancel the timer and wait for the task to exit.
    pub async fn shutdown(mut self) {
        self.shared.stop.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for LifecycleSimulator {
    fn drop(&mut self) {
        self.shared.stop.cancel();
    }
}

fn spawn_ticker(shared: Arc<Shared>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = shared.stop.cancelled() => break,

                _ = ticker.tick() => match shared.advance().await {
                    Ok(status) if status.is_terminal() => break,
                    Ok(_) => {}
                    Err(err) => {
                        debug!(error = %err, "lifecycle ticker stopping");
                        break;
                    }
                },
            }
        }
    })
}
