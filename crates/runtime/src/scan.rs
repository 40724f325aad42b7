//! Scan source port and the poller that drives it.

use std::io::BufRead;
use std::time::Duration;

use foundation::{LatLng, Timestamp};
use serde::{Deserialize, Serialize};
use signal::Observation;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// One network heard during a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReading {
    pub network_id: String,
    pub level_dbm: i32,
}

/// Everything heard in one scan, stamped with the position fix at the time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanBatch {
    /// `None` until the device has a location fix.
    #[serde(default)]
    pub position: Option<LatLng>,
    pub captured_at: Timestamp,
    pub readings: Vec<ScanReading>,
}

impl ScanBatch {
    /// Turns readings into observations, dropping unnamed networks and
    /// readings below `min_signal_dbm`. No position means no observations.
    pub fn into_observations(self, min_signal_dbm: i32) -> Vec<Observation> {
        let Some(position) = self.position else {
            return Vec::new();
        };
        let captured_at = self.captured_at;
        self.readings
            .into_iter()
            .filter(|r| !r.network_id.is_empty() && r.level_dbm >= min_signal_dbm)
            .map(|r| Observation::new(position, r.level_dbm, r.network_id, captured_at))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("scanner unavailable: {0}")]
    Unavailable(String),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("scan source i/o failed: {0}")]
    Io(String),
}

/// Something that can be asked for the networks currently in range.
pub trait ScanSource: Send + 'static {
    /// Returns the next batch, or `None` once the source is exhausted.
    fn scan(&mut self) -> Result<Option<ScanBatch>, ScanError>;
}

/// Replays JSON-lines scan batches, one per line. Blank lines are skipped.
#[derive(Debug)]
pub struct ReplaySource {
    lines: std::vec::IntoIter<(usize, String)>,
}

impl ReplaySource {
    pub fn from_reader(reader: impl BufRead) -> Result<Self, ScanError> {
        let mut lines = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| ScanError::Io(e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            lines.push((i + 1, line));
        }
        Ok(Self {
            lines: lines.into_iter(),
        })
    }
}

impl ScanSource for ReplaySource {
    fn scan(&mut self) -> Result<Option<ScanBatch>, ScanError> {
        let Some((line, text)) = self.lines.next() else {
            return Ok(None);
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ScanError::Parse {
                line,
                reason: e.to_string(),
            })
    }
}

/// Polls `source` every `interval` and forwards batches to `sender`.
///
/// A failed scan is logged and polling continues on the next tick. The task
/// ends when the source is exhausted or the receiver is gone, and returns the
/// number of batches forwarded.
pub fn spawn_poller<S: ScanSource>(
    mut source: S,
    interval: Duration,
    sender: mpsc::Sender<ScanBatch>,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut forwarded = 0u64;
        loop {
            ticker.tick().await;
            match source.scan() {
                Ok(Some(batch)) => {
                    if sender.send(batch).await.is_err() {
                        tracing::debug!("collector gone, stopping poller");
                        break;
                    }
                    forwarded += 1;
                }
                Ok(None) => {
                    tracing::debug!(forwarded, "scan source exhausted");
                    break;
                }
                Err(e) => tracing::warn!(error = %e, "scan failed"),
            }
        }
        forwarded
    })
}
