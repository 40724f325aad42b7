use foundation::{LatLng, Timestamp};
use serde::{Deserialize, Serialize};

use crate::quality::SignalQuality;

/// One received-signal reading of a network, taken at a known position.
///
/// Observations are immutable once created. The store assigns row identity;
/// the core only ever groups them by `network_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub latitude: f64,
    pub longitude: f64,
    /// Received power in dBm, typically in `-100..=0`. Not validated here.
    pub signal_dbm: i32,
    pub network_id: String,
    pub captured_at: Timestamp,
}

impl Observation {
    pub fn new(
        position: LatLng,
        signal_dbm: i32,
        network_id: impl Into<String>,
        captured_at: Timestamp,
    ) -> Self {
        Self {
            latitude: position.latitude,
            longitude: position.longitude,
            signal_dbm,
            network_id: network_id.into(),
            captured_at,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    pub fn quality(&self) -> SignalQuality {
        SignalQuality::from_dbm(self.signal_dbm)
    }
}

/// Network-level location estimate. Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub network_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Number of observations the estimate was computed from (before filtering).
    pub observation_count: usize,
}

impl Estimate {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}
