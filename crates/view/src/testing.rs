use foundation::{GeoBounds, LatLng, Timestamp};
use parking_lot::Mutex;
use signal::Observation;
use store::{InMemoryStore, MeasurementStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    InsertMany(usize),
    AllObservations,
    ObservationsFor(String),
    ObservationsForMany(usize),
    DistinctWithin,
    Distinct,
    DeleteAll,
}

/// Wraps an [`InMemoryStore`] and records every call made against it.
#[derive(Debug)]
pub struct RecordingStore {
    inner: InMemoryStore,
    calls: Mutex<Vec<StoreCall>>,
}

impl RecordingStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    pub fn reset(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().push(call);
    }
}

impl MeasurementStore for RecordingStore {
    fn insert_many(&self, observations: &[Observation]) -> Result<(), StoreError> {
        self.record(StoreCall::InsertMany(observations.len()));
        self.inner.insert_many(observations)
    }

    fn all_observations(&self) -> Result<Vec<Observation>, StoreError> {
        self.record(StoreCall::AllObservations);
        self.inner.all_observations()
    }

    fn observations_for(&self, network_id: &str) -> Result<Vec<Observation>, StoreError> {
        self.record(StoreCall::ObservationsFor(network_id.to_string()));
        self.inner.observations_for(network_id)
    }

    fn observations_for_many(
        &self,
        network_ids: &[String],
    ) -> Result<Vec<Observation>, StoreError> {
        self.record(StoreCall::ObservationsForMany(network_ids.len()));
        self.inner.observations_for_many(network_ids)
    }

    fn distinct_network_ids_within(&self, bounds: &GeoBounds) -> Result<Vec<String>, StoreError> {
        self.record(StoreCall::DistinctWithin);
        self.inner.distinct_network_ids_within(bounds)
    }

    fn distinct_network_ids(&self) -> Result<Vec<String>, StoreError> {
        self.record(StoreCall::Distinct);
        self.inner.distinct_network_ids()
    }

    fn delete_all(&self) -> Result<(), StoreError> {
        self.record(StoreCall::DeleteAll);
        self.inner.delete_all()
    }
}

pub fn obs(network_id: &str, lat: f64, lng: f64, dbm: i32) -> Observation {
    Observation::new(LatLng::new(lat, lng), dbm, network_id, Timestamp(0))
}
