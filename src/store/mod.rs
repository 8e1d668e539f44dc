//! Record stores - in-memory CRUD collections behind a simulated backend.
//!
//! Every entity kind (rides, drivers, messages, payment methods) gets its own
//! [`RecordStore`]. A store assigns sequential ids, hands out independent
//! copies on every read, and awaits a [`SimulatedBackend`] before each
//! operation so callers observe network-like latency and failures.
//!
//! ## Example
//!
//! ```ignore
//! use swiftride::store::{Record, RecordStore, SimulatedBackend};
//!
//! let store = RecordStore::<Driver>::new(SimulatedBackend::instant());
//! let driver = store.create(draft).await?;
//! let loaded = store.get_by_id(driver.id).await?;
//! ```

mod backend;
mod in_memory;

use serde::{de::DeserializeOwned, Serialize};

pub use backend::{LatencyProfile, OperationClass, SimulatedBackend};
pub use in_memory::RecordStore;

/// A record kept in a [`RecordStore`].
///
/// `Draft` is the caller-supplied creation input, merged over the kind's
/// defaults by [`Record::from_draft`]. `Patch` is the allow-list of fields a
/// caller may change after creation; `id` is never part of it.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name used in errors and log fields ("rides", "drivers", ...).
    const COLLECTION: &'static str;

    type Draft: Send;
    type Patch: Send;

    fn id(&self) -> u64;

    /// Build a new record with the store-assigned id.
    fn from_draft(id: u64, draft: Self::Draft) -> Self;

    /// Shallow, field-level merge of an allow-listed patch.
    fn apply(&mut self, patch: Self::Patch);
}

/// Error type for record store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No record with that id.
    #[error("{collection} record {id} not found")]
    NotFound { collection: &'static str, id: u64 },

    /// Simulated backend outage or random failure.
    #[error("{collection} backend unavailable during {operation}")]
    Unavailable {
        collection: &'static str,
        operation: OperationClass,
    },

    /// A previous holder of the collection lock panicked.
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),

    /// Seed data could not be decoded.
    #[error("record serialization error: {0}")]
    Serde(String),
}

impl StoreError {
    pub fn not_found<T: Record>(id: u64) -> Self {
        StoreError::NotFound {
            collection: T::COLLECTION,
            id,
        }
    }
}
