//! Simulated network backend: per-operation latency plus failure surfaces.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::StoreError;

/// Operation classes, each with its own simulated latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationClass {
    List,
    Get,
    Find,
    Create,
    Update,
    Delete,
}

impl fmt::Display for OperationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationClass::List => "list",
            OperationClass::Get => "get",
            OperationClass::Find => "find",
            OperationClass::Create => "create",
            OperationClass::Update => "update",
            OperationClass::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Milliseconds of simulated latency per operation class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyProfile {
    pub list_ms: u64,
    pub get_ms: u64,
    pub find_ms: u64,
    pub create_ms: u64,
    pub update_ms: u64,
    pub delete_ms: u64,
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            list_ms: 300,
            get_ms: 200,
            find_ms: 250,
            create_ms: 400,
            update_ms: 250,
            delete_ms: 200,
        }
    }
}

impl LatencyProfile {
    /// No latency at all.
    pub fn instant() -> Self {
        Self {
            list_ms: 0,
            get_ms: 0,
            find_ms: 0,
            create_ms: 0,
            update_ms: 0,
            delete_ms: 0,
        }
    }

    /// Same latency for every class.
    pub fn uniform(ms: u64) -> Self {
        Self {
            list_ms: ms,
            get_ms: ms,
            find_ms: ms,
            create_ms: ms,
            update_ms: ms,
            delete_ms: ms,
        }
    }

    pub fn for_class(&self, class: OperationClass) -> Duration {
        let ms = match class {
            OperationClass::List => self.list_ms,
            OperationClass::Get => self.get_ms,
            OperationClass::Find => self.find_ms,
            OperationClass::Create => self.create_ms,
            OperationClass::Update => self.update_ms,
            OperationClass::Delete => self.delete_ms,
        };
        Duration::from_millis(ms)
    }
}

/// Stand-in for the network service behind every store.
///
/// Clone-friendly via Arc: clones share the outage switch and the RNG, so a
/// test can take one clone offline and observe every store built from it
/// failing.
#[derive(Clone)]
pub struct SimulatedBackend {
    latency: LatencyProfile,
    failure_rate: f64,
    offline: Arc<AtomicBool>,
    rng: Arc<Mutex<StdRng>>,
}

impl fmt::Debug for SimulatedBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedBackend")
            .field("latency", &self.latency)
            .field("failure_rate", &self.failure_rate)
            .field("offline", &self.is_offline())
            .finish()
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(LatencyProfile::default())
    }
}

impl SimulatedBackend {
    pub fn new(latency: LatencyProfile) -> Self {
        Self {
            latency,
            failure_rate: 0.0,
            offline: Arc::new(AtomicBool::new(false)),
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    /// Zero latency, never fails.
    pub fn instant() -> Self {
        Self::new(LatencyProfile::instant())
    }

    /// Fail this fraction of calls (clamped to `[0, 1]`).
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Seed the RNG that decides random failures.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    /// A backend with a different latency profile that shares this one's
    /// outage switch and RNG.
    pub fn with_latency(&self, latency: LatencyProfile) -> Self {
        Self {
            latency,
            ..self.clone()
        }
    }

    pub fn latency(&self) -> &LatencyProfile {
        &self.latency
    }

    /// Take the backend offline (or bring it back). Every call fails while
    /// offline.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Await the simulated round trip for one operation.
    pub async fn call(
        &self,
        collection: &'static str,
        operation: OperationClass,
    ) -> Result<(), StoreError> {
        let delay = self.latency.for_class(operation);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.is_offline() || self.roll_failure()? {
            debug!(collection, %operation, "simulated backend failure");
            return Err(StoreError::Unavailable {
                collection,
                operation,
            });
        }

        Ok(())
    }

    fn roll_failure(&self) -> Result<bool, StoreError> {
        if self.failure_rate <= 0.0 {
            return Ok(false);
        }
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| StoreError::LockPoisoned("backend rng"))?;
        Ok(rng.gen_bool(self.failure_rate))
    }
}
