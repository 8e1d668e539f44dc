//! RecordStore - Vec-backed record collection for one entity kind.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::{OperationClass, Record, SimulatedBackend, StoreError};

struct Collection<T> {
    /// Insertion order.
    records: Vec<T>,
    /// Highest id ever issued, so deleted ids are never handed out again.
    high_water: u64,
}

impl<T: Record> Collection<T> {
    fn next_id(&self) -> u64 {
        let max_existing = self.records.iter().map(Record::id).max().unwrap_or(0);
        max_existing.max(self.high_water) + 1
    }

    fn position(&self, id: u64) -> Result<usize, StoreError> {
        self.records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| StoreError::not_found::<T>(id))
    }
}

/// In-memory store for one record kind.
///
/// Every operation first awaits the backend for its operation class, then
/// runs its whole critical section under one lock acquisition, so
/// concurrent creates from independent tasks still receive unique,
/// strictly increasing ids. The lock is never held across an `.await`.
///
/// Clone-friendly via Arc: clones share the same collection.
pub struct RecordStore<T> {
    backend: SimulatedBackend,
    state: Arc<RwLock<Collection<T>>>,
}

impl<T> Clone for RecordStore<T> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Record> RecordStore<T> {
    /// Create a new empty store.
    pub fn new(backend: SimulatedBackend) -> Self {
        Self::with_records(backend, Vec::new())
    }

    /// Create a store pre-seeded with records (kept in the given order).
    pub fn with_records(backend: SimulatedBackend, records: Vec<T>) -> Self {
        let high_water = records.iter().map(Record::id).max().unwrap_or(0);
        Self {
            backend,
            state: Arc::new(RwLock::new(Collection {
                records,
                high_water,
            })),
        }
    }

    /// Seed a store from a JSON array of records.
    pub fn from_json(backend: SimulatedBackend, json: &str) -> Result<Self, StoreError> {
        let records: Vec<T> =
            serde_json::from_str(json).map_err(|e| StoreError::Serde(e.to_string()))?;
        Ok(Self::with_records(backend, records))
    }

    pub fn backend(&self) -> &SimulatedBackend {
        &self.backend
    }

    /// Number of records, without simulated latency.
    pub fn len(&self) -> usize {
        self.read("len").map(|state| state.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every record, in insertion order.
    pub async fn list_all(&self) -> Result<Vec<T>, StoreError> {
        self.backend.call(T::COLLECTION, OperationClass::List).await?;
        let state = self.read("list")?;
        Ok(state.records.clone())
    }

    pub async fn get_by_id(&self, id: u64) -> Result<T, StoreError> {
        self.backend.call(T::COLLECTION, OperationClass::Get).await?;
        let state = self.read("get")?;
        let index = state.position(id)?;
        Ok(state.records[index].clone())
    }

    /// Copy of every record matching the predicate, in insertion order.
    pub async fn find<F>(&self, predicate: F) -> Result<Vec<T>, StoreError>
    where
        F: Fn(&T) -> bool,
    {
        self.backend.call(T::COLLECTION, OperationClass::Find).await?;
        let state = self.read("find")?;
        Ok(state
            .records
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect())
    }

    pub async fn create(&self, draft: T::Draft) -> Result<T, StoreError> {
        self.create_with(|_| Ok::<_, StoreError>(draft)).await
    }

    /// Create a record whose draft depends on the current collection.
    ///
    /// `build` runs inside the write lock, so the decision it makes (for
    /// example "is this the owner's first card?") cannot be invalidated by a
    /// concurrent create.
    pub async fn create_with<E, F>(&self, build: F) -> Result<T, E>
    where
        F: FnOnce(&[T]) -> Result<T::Draft, E>,
        E: From<StoreError>,
    {
        self.backend
            .call(T::COLLECTION, OperationClass::Create)
            .await?;
        let mut state = self.write("create")?;
        let draft = build(&state.records)?;
        let id = state.next_id();
        let record = T::from_draft(id, draft);
        state.records.push(record.clone());
        state.high_water = id;
        debug!(collection = T::COLLECTION, id, "record created");
        Ok(record)
    }

    pub async fn update(&self, id: u64, patch: T::Patch) -> Result<T, StoreError> {
        self.modify(id, |record| {
            record.apply(patch);
            Ok::<_, StoreError>(())
        })
        .await
    }

    /// Validated read-modify-write of one record.
    ///
    /// `change` works on a copy; the copy replaces the stored record only
    /// when `change` succeeds, so a rejected change leaves the store as it
    /// was.
    pub async fn modify<E, F>(&self, id: u64, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut T) -> Result<(), E>,
        E: From<StoreError>,
    {
        self.backend
            .call(T::COLLECTION, OperationClass::Update)
            .await?;
        let mut state = self.write("update")?;
        let index = state.position(id)?;
        let mut record = state.records[index].clone();
        change(&mut record)?;
        debug_assert_eq!(record.id(), id, "a record's id never changes");
        state.records[index] = record.clone();
        debug!(collection = T::COLLECTION, id, "record updated");
        Ok(record)
    }

    /// Batched update across the whole collection.
    ///
    /// All changes become visible at once or not at all; a concurrent
    /// reader sees either the old or the new collection, never a mix.
    pub async fn modify_all<R, E, F>(&self, change: F) -> Result<R, E>
    where
        F: FnOnce(&mut [T]) -> Result<R, E>,
        E: From<StoreError>,
    {
        self.backend
            .call(T::COLLECTION, OperationClass::Update)
            .await?;
        let mut state = self.write("batch update")?;
        let mut records = state.records.clone();
        let result = change(&mut records)?;
        debug_assert!(
            records
                .iter()
                .zip(state.records.iter())
                .all(|(new, old)| new.id() == old.id()),
            "a batch update never changes ids"
        );
        state.records = records;
        debug!(collection = T::COLLECTION, "batch update applied");
        Ok(result)
    }

    pub async fn delete(&self, id: u64) -> Result<bool, StoreError> {
        self.backend
            .call(T::COLLECTION, OperationClass::Delete)
            .await?;
        let mut state = self.write("delete")?;
        let index = state.position(id)?;
        state.records.remove(index);
        debug!(collection = T::COLLECTION, id, "record deleted");
        Ok(true)
    }

    fn read(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, Collection<T>>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }

    fn write(
        &self,
        operation: &'static str,
    ) -> Result<RwLockWriteGuard<'_, Collection<T>>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }
}
