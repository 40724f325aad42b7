use std::collections::{BTreeMap, BTreeSet};

use foundation::GeoBounds;
use parking_lot::RwLock;
use signal::Observation;

use crate::{MeasurementStore, StoreError};

/// Default bound-parameter ceiling, matching common embedded SQL engines.
pub const DEFAULT_PARAMETER_LIMIT: usize = 999;

/// Store-assigned row identity. Increases with insertion order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObservationId(pub u64);

#[derive(Debug, Default)]
struct Rows {
    next_id: u64,
    rows: BTreeMap<ObservationId, Observation>,
    closed: bool,
}

impl Rows {
    fn check_open(&self) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

/// Thread-safe in-memory [`MeasurementStore`].
///
/// Rows live in a `BTreeMap` keyed by insertion id so every query has a
/// stable traversal order.
#[derive(Debug)]
pub struct InMemoryStore {
    inner: RwLock<Rows>,
    parameter_limit: usize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Rows::default()),
            parameter_limit: DEFAULT_PARAMETER_LIMIT,
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter_limit(parameter_limit: usize) -> Self {
        Self {
            parameter_limit,
            ..Self::default()
        }
    }

    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let store = Self::default();
        {
            let mut inner = store.inner.write();
            for o in observations {
                let id = ObservationId(inner.next_id);
                inner.next_id += 1;
                inner.rows.insert(id, o);
            }
        }
        store
    }

    pub fn parameter_limit(&self) -> usize {
        self.parameter_limit
    }

    pub fn len(&self) -> usize {
        self.inner.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Makes every later call fail with [`StoreError::Closed`].
    pub fn close(&self) {
        self.inner.write().closed = true;
    }

    /// Rows in insertion order, for snapshotting.
    pub fn snapshot(&self) -> Vec<Observation> {
        self.inner.read().rows.values().cloned().collect()
    }
}

impl MeasurementStore for InMemoryStore {
    fn insert_many(&self, observations: &[Observation]) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        inner.check_open()?;
        for o in observations {
            let id = ObservationId(inner.next_id);
            inner.next_id += 1;
            inner.rows.insert(id, o.clone());
        }
        tracing::debug!(count = observations.len(), "inserted observations");
        Ok(())
    }

    fn all_observations(&self) -> Result<Vec<Observation>, StoreError> {
        let inner = self.inner.read();
        inner.check_open()?;
        let mut rows: Vec<(&ObservationId, &Observation)> = inner.rows.iter().collect();
        rows.sort_by(|(ia, a), (ib, b)| b.captured_at.cmp(&a.captured_at).then(ib.cmp(ia)));
        Ok(rows.into_iter().map(|(_, o)| o.clone()).collect())
    }

    fn observations_for(&self, network_id: &str) -> Result<Vec<Observation>, StoreError> {
        let inner = self.inner.read();
        inner.check_open()?;
        Ok(inner
            .rows
            .values()
            .filter(|o| o.network_id == network_id)
            .cloned()
            .collect())
    }

    fn observations_for_many(
        &self,
        network_ids: &[String],
    ) -> Result<Vec<Observation>, StoreError> {
        if network_ids.len() > self.parameter_limit {
            return Err(StoreError::TooManyParameters {
                requested: network_ids.len(),
                max: self.parameter_limit,
            });
        }
        let inner = self.inner.read();
        inner.check_open()?;
        let wanted: BTreeSet<&str> = network_ids.iter().map(String::as_str).collect();
        Ok(inner
            .rows
            .values()
            .filter(|o| wanted.contains(o.network_id.as_str()))
            .cloned()
            .collect())
    }

    fn distinct_network_ids_within(&self, bounds: &GeoBounds) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read();
        inner.check_open()?;
        let ids: BTreeSet<&str> = inner
            .rows
            .values()
            .filter(|o| bounds.contains(o.position()))
            .map(|o| o.network_id.as_str())
            .collect();
        Ok(ids.into_iter().map(str::to_string).collect())
    }

    fn distinct_network_ids(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read();
        inner.check_open()?;
        let ids: BTreeSet<&str> = inner.rows.values().map(|o| o.network_id.as_str()).collect();
        Ok(ids.into_iter().map(str::to_string).collect())
    }

    fn delete_all(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        inner.check_open()?;
        let removed = inner.rows.len();
        inner.rows.clear();
        tracing::debug!(removed, "deleted all observations");
        Ok(())
    }
}
