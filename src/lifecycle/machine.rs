use crate::error::{Error, Result};
use crate::ride::{Ride, RideStatus};

/// Minutes until pickup (or arrival) shown for each status. Non-increasing
/// along the forward chain.
pub fn eta_for(status: RideStatus) -> u32 {
    match status {
        RideStatus::Searching => 5,
        RideStatus::Assigned => 4,
        RideStatus::Arriving => 2,
        RideStatus::InProgress | RideStatus::Completed | RideStatus::Cancelled => 0,
    }
}

/// Rider-facing notification for entering a status.
pub fn message_for(status: RideStatus) -> &'static str {
    match status {
        RideStatus::Searching => "Searching for nearby drivers...",
        RideStatus::Assigned => "Driver assigned! They are on their way.",
        RideStatus::Arriving => "Your driver is arriving soon!",
        RideStatus::InProgress => "Ride started! Enjoy your journey.",
        RideStatus::Completed => "Ride completed! Thanks for choosing SwiftRide.",
        RideStatus::Cancelled => "Ride cancelled successfully",
    }
}

/// Local model of one tracked ride.
#[derive(Debug, Clone)]
pub struct RideMachine {
    ride: Ride,
    eta_minutes: u32,
}

impl RideMachine {
    pub fn new(ride: Ride) -> Self {
        let eta_minutes = eta_for(ride.status);
        Self { ride, eta_minutes }
    }

    pub fn ride(&self) -> &Ride {
        &self.ride
    }

    pub fn status(&self) -> RideStatus {
        self.ride.status
    }

    pub fn eta_minutes(&self) -> u32 {
        self.eta_minutes
    }

    pub fn is_terminal(&self) -> bool {
        self.ride.status.is_terminal()
    }

    /// The status the next step would enter, without taking it.
    pub fn next_status(&self) -> Result<RideStatus> {
        let from = self.ride.status;
        from.next().ok_or(Error::InvalidTransition { from, to: from })
    }

    /// One step along the forward chain.
    pub fn advance(&mut self) -> Result<RideStatus> {
        let to = self.next_status()?;
        self.enter(to);
        Ok(to)
    }

    pub fn cancel(&mut self) -> Result<()> {
        let from = self.ride.status;
        if !from.can_transition_to(RideStatus::Cancelled) {
            return Err(Error::InvalidTransition {
                from,
                to: RideStatus::Cancelled,
            });
        }
        self.enter(RideStatus::Cancelled);
        Ok(())
    }

    pub fn assign_driver(&mut self, driver_id: u64) {
        self.ride.driver_id = Some(driver_id);
    }

    fn enter(&mut self, status: RideStatus) {
        self.ride.status = status;
        self.eta_minutes = eta_for(status);
    }
}
