//! Archive locations

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two independent archive roots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Always-available root under the gamesave data directory
    Local,
    /// Folder synchronized by an external agent
    Mirror,
}

impl Location {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Some(Self::Local),
            "mirror" | "cloud" => Some(Self::Mirror),
            _ => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "Local"),
            Self::Mirror => write!(f, "Mirror"),
        }
    }
}
