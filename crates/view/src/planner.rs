//! Viewport query planning.
//!
//! Visibility decides *which* networks are shown, but each network's estimate
//! uses its complete history. Summary mode therefore runs a presence query
//! against the viewport first, then fetches every observation of the
//! networks it found, batched to respect the store's parameter ceiling.

use std::collections::BTreeSet;

use foundation::GeoBounds;
use signal::Observation;
use store::{MAX_IDS_PER_QUERY, MeasurementStore, StoreError};

use crate::mode::ViewMode;

/// Store reads needed for one refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPlan {
    /// Networks seen inside `bounds`, then all of their observations.
    Visible { bounds: GeoBounds },
    /// Summary before any viewport is known: every network in the store.
    AllNetworks,
    /// One network's observations; the viewport is ignored.
    Network { network_id: String },
}

impl QueryPlan {
    pub fn for_mode(mode: &ViewMode, bounds: Option<&GeoBounds>) -> Self {
        match (mode, bounds) {
            (ViewMode::Detail(id), _) => QueryPlan::Network {
                network_id: id.clone(),
            },
            (ViewMode::Summary, Some(b)) => QueryPlan::Visible { bounds: *b },
            (ViewMode::Summary, None) => QueryPlan::AllNetworks,
        }
    }
}

/// Raw rows produced by executing a [`QueryPlan`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fetched {
    /// Identifiers selected by the presence step. Empty for [`QueryPlan::Network`].
    pub network_ids: Vec<String>,
    pub observations: Vec<Observation>,
}

pub fn execute<S: MeasurementStore + ?Sized>(
    store: &S,
    plan: &QueryPlan,
) -> Result<Fetched, StoreError> {
    match plan {
        QueryPlan::Visible { bounds } => {
            let network_ids = store.distinct_network_ids_within(bounds)?;
            let observations = fetch_batched(store, &network_ids, MAX_IDS_PER_QUERY)?;
            Ok(Fetched {
                network_ids,
                observations,
            })
        }
        QueryPlan::AllNetworks => {
            let network_ids = store.distinct_network_ids()?;
            let observations = fetch_batched(store, &network_ids, MAX_IDS_PER_QUERY)?;
            Ok(Fetched {
                network_ids,
                observations,
            })
        }
        QueryPlan::Network { network_id } => {
            let observations = store.observations_for(network_id)?;
            tracing::debug!(network_id = %network_id, rows = observations.len(), "fetched network");
            Ok(Fetched {
                network_ids: Vec::new(),
                observations,
            })
        }
    }
}

/// Fetches all observations for `network_ids`, at most `batch_size` ids per
/// store call, and concatenates the results.
///
/// Duplicate ids are collapsed first so no network is read twice. An empty
/// id list makes no store call.
pub fn fetch_batched<S: MeasurementStore + ?Sized>(
    store: &S,
    network_ids: &[String],
    batch_size: usize,
) -> Result<Vec<Observation>, StoreError> {
    if network_ids.is_empty() {
        return Ok(Vec::new());
    }
    let batch_size = batch_size.clamp(1, MAX_IDS_PER_QUERY);

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let unique: Vec<String> = network_ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect();

    let mut out = Vec::new();
    for (i, batch) in unique.chunks(batch_size).enumerate() {
        let rows = store.observations_for_many(batch)?;
        tracing::debug!(batch = i, ids = batch.len(), rows = rows.len(), "fetched batch");
        out.extend(rows);
    }
    Ok(out)
}
