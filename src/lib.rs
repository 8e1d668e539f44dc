//! SwiftRide - ride lifecycle engine behind a ride-hailing demo.
//!
//! Records live in in-memory stores behind a simulated backend; rides move
//! through their statuses on a timer; riders chat with a simulated driver
//! and manage stored cards. Everything is in-process and async.

pub mod chat;
pub mod config;
pub mod driver;
#[cfg(feature = "emitter")]
pub mod emitter;
mod engine;
mod error;
pub mod lifecycle;
mod location;
pub mod payment;
pub mod ride;
pub mod store;

pub use chat::{ChatService, ChatSession, SenderRole};
pub use config::{ConfigError, EngineConfig};
pub use driver::{Driver, DriverDirectory};
pub use engine::Engine;
pub use error::{Error, Result, ValidationError};
pub use lifecycle::{EventKind, LifecycleEvent, LifecycleEvents, LifecycleSimulator};
pub use location::{Coordinate, Location};
pub use payment::{CardDetails, PaymentManager, PaymentMethod};
pub use ride::{BookingRequest, Ride, RideService, RideStatus, RideType};
