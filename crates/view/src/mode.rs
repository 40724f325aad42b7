use serde::{Deserialize, Serialize};

/// Which view is active: every visible network, or one drilled-into network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", content = "network_id", rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Summary,
    Detail(String),
}

impl ViewMode {
    pub fn is_summary(&self) -> bool {
        matches!(self, ViewMode::Summary)
    }

    pub fn selected(&self) -> Option<&str> {
        match self {
            ViewMode::Summary => None,
            ViewMode::Detail(id) => Some(id),
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewMode::Summary => write!(f, "summary"),
            ViewMode::Detail(id) => write!(f, "detail({id})"),
        }
    }
}
