//! Pretty-printed JSON snapshots of observation tables.

use std::path::Path;

use signal::Observation;

use crate::StoreError;

pub fn to_json(observations: &[Observation]) -> Result<String, StoreError> {
    serde_json::to_string_pretty(observations).map_err(|e| StoreError::Corrupt(e.to_string()))
}

pub fn from_json(json: &str) -> Result<Vec<Observation>, StoreError> {
    serde_json::from_str(json).map_err(|e| StoreError::Corrupt(e.to_string()))
}

/// Reads a snapshot file. A missing file is an empty table.
pub fn read_snapshot(path: &Path) -> Result<Vec<Observation>, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(text) => from_json(&text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no snapshot yet, starting empty");
            Ok(Vec::new())
        }
        Err(e) => Err(StoreError::Io(format!("read {}: {e}", path.display()))),
    }
}

/// Writes a snapshot through a sibling temp file so readers never see a torn file.
pub fn write_snapshot(path: &Path, observations: &[Observation]) -> Result<(), StoreError> {
    let payload = to_json(observations)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, payload)
        .map_err(|e| StoreError::Io(format!("write {}: {e}", tmp.display())))?;
    std::fs::rename(&tmp, path)
        .map_err(|e| StoreError::Io(format!("rename into {}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), count = observations.len(), "wrote snapshot");
    Ok(())
}
