use foundation::{GeoBounds, LatLng};
use serde::{Deserialize, Serialize};
use signal::{
    Estimate, Observation, SignalQuality, compare_network_ids, group_and_estimate,
    weighted_centroid,
};
use store::{MeasurementStore, StoreError};

use crate::mode::ViewMode;
use crate::planner::{QueryPlan, execute};

/// One supporting reading in a detail view, tagged with its quality band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportingObservation {
    #[serde(flatten)]
    pub observation: Observation,
    pub quality: SignalQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailView {
    pub estimate: Estimate,
    pub supporting: Vec<SupportingObservation>,
}

impl DetailView {
    /// Line segments from the estimate to every supporting reading.
    pub fn connecting_lines(&self) -> impl Iterator<Item = (LatLng, LatLng)> + '_ {
        let from = self.estimate.position();
        self.supporting
            .iter()
            .map(move |s| (from, s.observation.position()))
    }
}

/// What the renderer should draw after a refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RefreshOutput {
    Summary {
        /// One estimate per visible network, ordered case-insensitively by id.
        items: Vec<Estimate>,
        /// Networks found by the presence query.
        visible_networks: usize,
    },
    Detail {
        network_id: String,
        #[serde(flatten)]
        detail: DetailView,
    },
    /// The selected network has no observations left.
    StaleSelection { network_id: String },
}

impl RefreshOutput {
    pub fn mode(&self) -> ViewMode {
        match self {
            RefreshOutput::Summary { .. } => ViewMode::Summary,
            RefreshOutput::Detail { network_id, .. }
            | RefreshOutput::StaleSelection { network_id } => ViewMode::Detail(network_id.clone()),
        }
    }

    /// One-line status text for the current view.
    pub fn status_line(&self) -> String {
        match self {
            RefreshOutput::Summary {
                visible_networks, ..
            } => format!("Viewing {visible_networks} unique networks in area"),
            RefreshOutput::Detail { network_id, detail } => {
                format!("Detail: {network_id} ({} points)", detail.supporting.len())
            }
            RefreshOutput::StaleSelection { network_id } => {
                format!("Network {network_id} has no observations")
            }
        }
    }
}

/// Runs the store reads for `mode` and turns them into renderable output.
///
/// `bounds` only matters in summary mode. Store failures are returned as-is.
pub fn refresh<S: MeasurementStore + ?Sized>(
    store: &S,
    mode: &ViewMode,
    bounds: Option<&GeoBounds>,
) -> Result<RefreshOutput, StoreError> {
    let plan = QueryPlan::for_mode(mode, bounds);
    let fetched = execute(store, &plan)?;

    match mode {
        ViewMode::Summary => {
            let mut items: Vec<Estimate> =
                group_and_estimate(&fetched.observations).into_values().collect();
            items.sort_by(|a, b| compare_network_ids(&a.network_id, &b.network_id));
            tracing::debug!(
                visible = fetched.network_ids.len(),
                estimates = items.len(),
                "summary refreshed"
            );
            Ok(RefreshOutput::Summary {
                items,
                visible_networks: fetched.network_ids.len(),
            })
        }
        ViewMode::Detail(network_id) => {
            if fetched.observations.is_empty() {
                return Ok(RefreshOutput::StaleSelection {
                    network_id: network_id.clone(),
                });
            }
            let p = weighted_centroid(&fetched.observations);
            let estimate = Estimate {
                network_id: network_id.clone(),
                latitude: p.latitude,
                longitude: p.longitude,
                observation_count: fetched.observations.len(),
            };
            let supporting = fetched
                .observations
                .into_iter()
                .map(|o| SupportingObservation {
                    quality: o.quality(),
                    observation: o,
                })
                .collect();
            Ok(RefreshOutput::Detail {
                network_id: network_id.clone(),
                detail: DetailView {
                    estimate,
                    supporting,
                },
            })
        }
    }
}
