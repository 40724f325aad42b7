//! Weighted-centroid location estimator.
//!
//! Readings far below the strongest one are dropped, the survivors are
//! weighted by `max(1, OFFSET + dBm) ^ EXPONENT`, and the weighted mean of
//! their positions is the estimate. The steep exponent lets a few strong
//! readings near the emitter outvote many weak ones taken along the
//! observer's path.

use std::borrow::Borrow;

use foundation::LatLng;

use crate::observation::Observation;

/// Readings weaker than `strongest - SIGNAL_FILTER_THRESHOLD_DB` are ignored.
pub const SIGNAL_FILTER_THRESHOLD_DB: i32 = 25;

/// Shifts the plausible dBm range (about -110..0) onto positive weights.
pub const WEIGHT_OFFSET: f64 = 110.0;

pub const WEIGHT_EXPONENT: f64 = 6.0;

/// Weight of a single reading. Never below 1.
pub fn signal_weight(signal_dbm: i32) -> f64 {
    (WEIGHT_OFFSET + signal_dbm as f64)
        .max(1.0)
        .powf(WEIGHT_EXPONENT)
}

/// Returns `true` if a reading survives the filter relative to `strongest_dbm`.
pub fn passes_filter(signal_dbm: i32, strongest_dbm: i32) -> bool {
    signal_dbm >= strongest_dbm.saturating_sub(SIGNAL_FILTER_THRESHOLD_DB)
}

/// Estimates the emitter position from readings of one network.
///
/// Returns `None` for an empty input. Callers are expected to pass only
/// observations sharing a `network_id`; mixing networks is not detected.
pub fn try_weighted_centroid<O: Borrow<Observation>>(observations: &[O]) -> Option<LatLng> {
    let first = observations.first()?.borrow();
    let strongest = observations
        .iter()
        .map(|o| o.borrow().signal_dbm)
        .max()?;

    let mut total_weight = 0.0f64;
    let mut weighted_lat = 0.0f64;
    let mut weighted_lng = 0.0f64;

    for o in observations {
        let o = o.borrow();
        if !passes_filter(o.signal_dbm, strongest) {
            continue;
        }
        let weight = signal_weight(o.signal_dbm);
        weighted_lat += o.latitude * weight;
        weighted_lng += o.longitude * weight;
        total_weight += weight;
    }

    // Unreachable given the weight floor, but never divide by zero.
    if total_weight == 0.0 {
        return Some(first.position());
    }

    Some(LatLng::new(
        weighted_lat / total_weight,
        weighted_lng / total_weight,
    ))
}

/// Like [`try_weighted_centroid`], but degrades to [`LatLng::ORIGIN`] for an
/// empty input. The origin is a sentinel, not a real estimate.
pub fn weighted_centroid<O: Borrow<Observation>>(observations: &[O]) -> LatLng {
    match try_weighted_centroid(observations) {
        Some(p) => p,
        None => {
            tracing::warn!("weighted centroid requested for zero observations");
            LatLng::ORIGIN
        }
    }
}
