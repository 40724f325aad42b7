use serde::{Deserialize, Serialize};

/// Coarse signal-strength band used to colour individual readings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalQuality {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl SignalQuality {
    pub fn from_dbm(dbm: i32) -> Self {
        if dbm >= -50 {
            SignalQuality::Excellent
        } else if dbm >= -60 {
            SignalQuality::Good
        } else if dbm >= -70 {
            SignalQuality::Fair
        } else {
            SignalQuality::Poor
        }
    }

    /// Marker hue in degrees: green, yellow, orange, red.
    pub fn hue(self) -> f32 {
        match self {
            SignalQuality::Excellent => 120.0,
            SignalQuality::Good => 60.0,
            SignalQuality::Fair => 30.0,
            SignalQuality::Poor => 0.0,
        }
    }
}

impl std::fmt::Display for SignalQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalQuality::Excellent => write!(f, "excellent"),
            SignalQuality::Good => write!(f, "good"),
            SignalQuality::Fair => write!(f, "fair"),
            SignalQuality::Poor => write!(f, "poor"),
        }
    }
}
