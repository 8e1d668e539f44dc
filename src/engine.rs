//! Engine - builds every store and service from one [`EngineConfig`].

use tracing::info;

use crate::chat::ChatService;
use crate::config::{ConfigError, EngineConfig};
use crate::driver::{default_fleet, DriverDirectory};
use crate::payment::PaymentManager;
use crate::ride::{RideRepository, RideService};
use crate::store::{RecordStore, SimulatedBackend};

/// The whole ride-hailing backend, with its own isolated stores.
///
/// ## Example
///
/// ```ignore
/// use swiftride::{BookingRequest, Engine, EngineConfig};
///
/// let engine = Engine::new(EngineConfig::default())?;
/// let ride = engine.rides().create_ride(
///     BookingRequest::new("user123", "Current Location", "Airport Terminal 1"),
/// ).await?;
/// let mut events = engine.rides().subscribe(ride.id).await?;
/// while let Some(event) = events.next().await {
///     println!("{}", event.message);
/// }
/// ```
pub struct Engine {
    config: EngineConfig,
    backend: SimulatedBackend,
    rides: RideService,
    chat: ChatService,
    payments: PaymentManager,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut backend =
            SimulatedBackend::new(config.latency).with_failure_rate(config.failure_rate);
        if let Some(seed) = config.seed {
            backend = backend.with_seed(seed);
        }
        let message_backend = backend.with_latency(config.message_latency);

        let mut repository = RideRepository::new(RecordStore::new(backend.clone()));
        if let Some(seed) = config.seed {
            repository = repository.with_seed(seed);
        }
        let fleet = if config.seed_fleet {
            default_fleet()
        } else {
            Vec::new()
        };
        let drivers = DriverDirectory::new(RecordStore::with_records(backend.clone(), fleet));

        let rides = RideService::new(repository, drivers).with_tick_interval(config.tick_interval());
        let chat = ChatService::new(RecordStore::new(message_backend))
            .with_reply_delay(config.reply_delay());
        let payments = PaymentManager::new(RecordStore::new(backend.clone()));

        info!(
            tick_interval_ms = config.tick_interval_ms,
            reply_delay_ms = config.reply_delay_ms,
            failure_rate = config.failure_rate,
            "engine ready"
        );
        Ok(Self {
            config,
            backend,
            rides,
            chat,
            payments,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared by every store; take it offline to simulate an outage.
    pub fn backend(&self) -> &SimulatedBackend {
        &self.backend
    }

    pub fn rides(&self) -> &RideService {
        &self.rides
    }

    pub fn drivers(&self) -> &DriverDirectory {
        self.rides.drivers()
    }

    pub fn chat(&self) -> &ChatService {
        &self.chat
    }

    pub fn payments(&self) -> &PaymentManager {
        &self.payments
    }
}
