//! Rides: the record model, the repository guarding status writes, and the
//! service behind the booking, tracking and rating screens.

mod booking;
mod model;
mod repository;
mod service;

pub use booking::BookingRequest;
pub use model::{Money, PaymentRef, Ride, RideDraft, RidePatch, RideStatus, RideType};
pub use repository::{RideRepository, TripQuote};
pub use service::RideService;
