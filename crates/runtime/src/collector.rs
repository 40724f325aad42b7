//! Background ingestion of scan batches into the measurement store.
//!
//! Producers push [`ScanBatch`]es into a channel; the collector is the only
//! component that writes to the store. It owns the [`TrackingState`].

use std::sync::Arc;

use store::{MeasurementStore, StoreError};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::TrackerConfig;
use crate::scan::ScanBatch;
use crate::tracking::{TrackingState, TrackingStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectorStats {
    pub batches_received: u64,
    /// Batches with no position fix.
    pub batches_without_fix: u64,
    pub observations_stored: u64,
    pub failed_inserts: u64,
    pub last_error: Option<StoreError>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectorError {
    #[error("collector task failed: {0}")]
    Task(String),
}

/// Handle to a running collector.
#[derive(Debug)]
pub struct CollectorHandle {
    sender: mpsc::Sender<ScanBatch>,
    shutdown: oneshot::Sender<()>,
    status: TrackingStatus,
    task: JoinHandle<CollectorStats>,
}

impl CollectorHandle {
    /// A new producer endpoint. The collector keeps running while any exist.
    pub fn sender(&self) -> mpsc::Sender<ScanBatch> {
        self.sender.clone()
    }

    pub fn status(&self) -> TrackingStatus {
        self.status.clone()
    }

    /// Stops accepting batches from this handle and waits until every other
    /// producer has hung up and the channel is drained.
    pub async fn finish(self) -> Result<CollectorStats, CollectorError> {
        let CollectorHandle {
            sender,
            shutdown,
            task,
            ..
        } = self;
        drop(sender);
        let stats = task.await.map_err(|e| CollectorError::Task(e.to_string()));
        drop(shutdown);
        stats
    }

    /// Stops immediately; batches still queued are dropped.
    pub async fn stop(self) -> Result<CollectorStats, CollectorError> {
        let _ = self.shutdown.send(());
        self.task
            .await
            .map_err(|e| CollectorError::Task(e.to_string()))
    }
}

/// Starts a collector writing into `store`.
pub fn spawn_collector(
    store: Arc<dyn MeasurementStore>,
    config: &TrackerConfig,
) -> CollectorHandle {
    let (sender, mut receiver) = mpsc::channel::<ScanBatch>(config.channel_capacity.max(1));
    let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
    let min_signal_dbm = config.min_signal_dbm;

    let state = TrackingState::new();
    let status = state.status();
    let running = state.start();

    let task = tokio::spawn(async move {
        let _running = running;
        tracing::info!(min_signal_dbm, "tracking started");
        let mut stats = CollectorStats::default();

        loop {
            let batch = tokio::select! {
                biased;
                _ = &mut shutdown_rx => break,
                batch = receiver.recv() => match batch {
                    Some(b) => b,
                    None => break,
                },
            };
            stats.batches_received += 1;

            if batch.position.is_none() {
                stats.batches_without_fix += 1;
                continue;
            }
            let observations = batch.into_observations(min_signal_dbm);
            if observations.is_empty() {
                continue;
            }

            let count = observations.len() as u64;
            let store = store.clone();
            let inserted =
                tokio::task::spawn_blocking(move || store.insert_many(&observations)).await;
            match inserted {
                Ok(Ok(())) => stats.observations_stored += count,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "failed to store scan batch");
                    stats.failed_inserts += 1;
                    stats.last_error = Some(e);
                }
                Err(e) => {
                    tracing::error!(error = %e, "store insert task failed");
                    stats.failed_inserts += 1;
                    stats.last_error = Some(StoreError::Io(e.to_string()));
                }
            }
        }

        tracing::info!(
            batches = stats.batches_received,
            stored = stats.observations_stored,
            "tracking stopped"
        );
        stats
    });

    CollectorHandle {
        sender,
        shutdown,
        status,
        task,
    }
}
