//! Ride lifecycle: the status machine and the timer that drives it.

mod events;
mod machine;
mod simulator;

pub use events::{EventKind, LifecycleEvent, LifecycleEvents};
pub use machine::{eta_for, message_for, RideMachine};
pub use simulator::{LifecycleDeps, LifecycleSimulator, MIN_TICK_INTERVAL};
