//! Measurement store contract.
//!
//! The store is an external collaborator: durable persistence lives behind
//! [`MeasurementStore`]. This crate ships an in-memory implementation and a
//! JSON snapshot codec so the rest of the workspace can run without one.

pub mod json;
pub mod memory;

pub use memory::*;

use foundation::GeoBounds;
use signal::Observation;

/// Upper bound on identifiers passed to a single
/// [`MeasurementStore::observations_for_many`] call. Callers batch larger sets.
pub const MAX_IDS_PER_QUERY: usize = 900;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(String),

    #[error("store data corrupt: {0}")]
    Corrupt(String),

    #[error("query has {requested} bound parameters, store allows at most {max}")]
    TooManyParameters { requested: usize, max: usize },

    #[error("store is closed")]
    Closed,
}

/// Query and insert operations the localization core relies on.
///
/// Implementations must be callable from a background thread; the core takes
/// results by value and never holds borrows across calls.
pub trait MeasurementStore: Send + Sync {
    fn insert_many(&self, observations: &[Observation]) -> Result<(), StoreError>;

    /// Every stored observation, newest first.
    fn all_observations(&self) -> Result<Vec<Observation>, StoreError>;

    fn observations_for(&self, network_id: &str) -> Result<Vec<Observation>, StoreError>;

    /// Observations for any of `network_ids`.
    ///
    /// Callers must pass at most [`MAX_IDS_PER_QUERY`] identifiers.
    fn observations_for_many(&self, network_ids: &[String])
    -> Result<Vec<Observation>, StoreError>;

    /// Distinct identifiers with at least one observation inside `bounds`.
    fn distinct_network_ids_within(&self, bounds: &GeoBounds) -> Result<Vec<String>, StoreError>;

    /// Distinct identifiers across the whole store.
    fn distinct_network_ids(&self) -> Result<Vec<String>, StoreError>;

    fn delete_all(&self) -> Result<(), StoreError>;
}

impl<T: MeasurementStore + ?Sized> MeasurementStore for std::sync::Arc<T> {
    fn insert_many(&self, observations: &[Observation]) -> Result<(), StoreError> {
        (**self).insert_many(observations)
    }

    fn all_observations(&self) -> Result<Vec<Observation>, StoreError> {
        (**self).all_observations()
    }

    fn observations_for(&self, network_id: &str) -> Result<Vec<Observation>, StoreError> {
        (**self).observations_for(network_id)
    }

    fn observations_for_many(
        &self,
        network_ids: &[String],
    ) -> Result<Vec<Observation>, StoreError> {
        (**self).observations_for_many(network_ids)
    }

    fn distinct_network_ids_within(&self, bounds: &GeoBounds) -> Result<Vec<String>, StoreError> {
        (**self).distinct_network_ids_within(bounds)
    }

    fn distinct_network_ids(&self) -> Result<Vec<String>, StoreError> {
        (**self).distinct_network_ids()
    }

    fn delete_all(&self) -> Result<(), StoreError> {
        (**self).delete_all()
    }
}
