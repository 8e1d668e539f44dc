//! Shared helpers for the engine integration suites.

use std::time::Duration;

use swiftride::{BookingRequest, Engine, EngineConfig, Location};
use tracing_subscriber::EnvFilter;

pub const TICK: Duration = Duration::from_secs(8);

/// Route engine logs to the test output; `RUST_LOG=debug` for detail.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Zero-latency engine with the default timers and a fixed seed.
pub fn engine() -> Engine {
    init_tracing();
    Engine::new(EngineConfig::instant().with_seed(42)).unwrap()
}

/// Engine with the default latency profile, for tests on a paused clock.
pub fn slow_engine() -> Engine {
    init_tracing();
    Engine::new(EngineConfig::default().with_seed(42)).unwrap()
}

pub fn airport_trip(rider_id: &str) -> BookingRequest {
    BookingRequest::new(
        rider_id,
        Location::new("123 Main St, Downtown").with_coordinate(40.7128, -74.0060),
        Location::new("Airport Terminal 1").with_coordinate(40.6413, -73.7781),
    )
}
