//! Engine configuration, loadable from JSON.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::store::LatencyProfile;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Time between lifecycle steps.
    pub tick_interval_ms: u64,
    /// Delay before the simulated driver answers a chat message.
    pub reply_delay_ms: u64,
    /// Latency for rides, drivers and payment methods.
    pub latency: LatencyProfile,
    /// Latency for chat messages, whose writes are quicker.
    pub message_latency: LatencyProfile,
    /// Fraction of backend calls that fail at random, `0.0..=1.0`.
    pub failure_rate: f64,
    /// Fixes fares, trip estimates and random failures.
    pub seed: Option<u64>,
    /// Start with the default driver fleet.
    pub seed_fleet: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 8000,
            reply_delay_ms: 2000,
            latency: LatencyProfile::default(),
            message_latency: LatencyProfile {
                create_ms: 300,
                ..LatencyProfile::default()
            },
            failure_rate: 0.0,
            seed: None,
            seed_fleet: true,
        }
    }
}

impl EngineConfig {
    /// Zero latency everywhere; timers keep their defaults.
    pub fn instant() -> Self {
        Self {
            latency: LatencyProfile::instant(),
            message_latency: LatencyProfile::instant(),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Validation("tick_interval_ms must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(ConfigError::Validation(
                "failure_rate must be within 0.0..=1.0".into(),
            ));
        }
        Ok(())
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_latency(mut self, latency: LatencyProfile) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_message_latency(mut self, latency: LatencyProfile) -> Self {
        self.message_latency = latency;
        self
    }

    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_seed_fleet(mut self, seed_fleet: bool) -> Self {
        self.seed_fleet = seed_fleet;
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}
