use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 10;
/// Readings weaker than this are not worth storing.
pub const DEFAULT_MIN_SIGNAL_DBM: i32 = -90;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;
pub const DEFAULT_DATA_PATH: &str = "tracker-data.json";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub scan_interval: Duration,
    pub min_signal_dbm: i32,
    pub channel_capacity: usize,
    pub data_path: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_secs(DEFAULT_SCAN_INTERVAL_SECS),
            min_signal_dbm: DEFAULT_MIN_SIGNAL_DBM,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
        }
    }
}

impl TrackerConfig {
    /// Reads `TRACKER_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`TrackerConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let interval_secs = env_var_u64(
            &lookup,
            "TRACKER_SCAN_INTERVAL_SECS",
            DEFAULT_SCAN_INTERVAL_SECS,
        )?;
        if interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "TRACKER_SCAN_INTERVAL_SECS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let capacity = env_var_u64(
            &lookup,
            "TRACKER_CHANNEL_CAPACITY",
            DEFAULT_CHANNEL_CAPACITY as u64,
        )?;
        if capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "TRACKER_CHANNEL_CAPACITY",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            scan_interval: Duration::from_secs(interval_secs),
            min_signal_dbm: env_var_i32(&lookup, "TRACKER_MIN_SIGNAL_DBM", DEFAULT_MIN_SIGNAL_DBM)?,
            channel_capacity: capacity as usize,
            data_path: lookup("TRACKER_DATA")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
        })
    }
}

fn env_var_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn env_var_i32(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: i32,
) -> Result<i32, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<i32>().map_err(|e| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, TrackerConfig};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = TrackerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, TrackerConfig::default());
        assert_eq!(cfg.scan_interval, Duration::from_secs(10));
        assert_eq!(cfg.min_signal_dbm, -90);
    }

    #[test]
    fn reads_overrides() {
        let cfg = TrackerConfig::from_lookup(lookup(&[
            ("TRACKER_SCAN_INTERVAL_SECS", "3"),
            ("TRACKER_MIN_SIGNAL_DBM", " -80 "),
            ("TRACKER_DATA", "/tmp/x.json"),
        ]))
        .unwrap();
        assert_eq!(cfg.scan_interval, Duration::from_secs(3));
        assert_eq!(cfg.min_signal_dbm, -80);
        assert_eq!(cfg.data_path, PathBuf::from("/tmp/x.json"));
    }

    #[test]
    fn rejects_garbage_and_zero() {
        let err = TrackerConfig::from_lookup(lookup(&[("TRACKER_MIN_SIGNAL_DBM", "loud")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "TRACKER_MIN_SIGNAL_DBM",
                ..
            }
        ));
        let zero_interval = lookup(&[("TRACKER_SCAN_INTERVAL_SECS", "0")]);
        assert!(TrackerConfig::from_lookup(zero_interval).is_err());
        let zero_capacity = lookup(&[("TRACKER_CHANNEL_CAPACITY", "0")]);
        assert!(TrackerConfig::from_lookup(zero_capacity).is_err());
    }
}
