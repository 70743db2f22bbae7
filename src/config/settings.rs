//! User settings for gamesave
//!
//! Manages the process-wide retention limits for both archive locations and
//! the optional mirror path.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::paths::GameSavePaths;
use crate::error::GameSaveError;
use crate::storage::file_io::write_json_atomic;

/// Retention limits for one location. A limit of 0 keeps every archive of that class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionLimits {
    /// Maximum automatic archives to keep
    pub auto_limit: u32,
    /// Maximum manual archives to keep
    pub manual_limit: u32,
}

impl RetentionLimits {
    pub fn new(auto_limit: u32, manual_limit: u32) -> Self {
        Self {
            auto_limit,
            manual_limit,
        }
    }

    /// Limits that never delete anything
    pub fn unlimited() -> Self {
        Self::new(0, 0)
    }
}

/// Retention limits for the local and mirror locations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionSettings {
    #[serde(default = "default_local_limits")]
    pub local: RetentionLimits,
    #[serde(default = "default_mirror_limits")]
    pub mirror: RetentionLimits,
}

fn default_local_limits() -> RetentionLimits {
    RetentionLimits::new(20, 0)
}

fn default_mirror_limits() -> RetentionLimits {
    RetentionLimits::new(10, 25)
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self {
            local: default_local_limits(),
            mirror: default_mirror_limits(),
        }
    }
}

/// User settings for gamesave
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Retention limits per location
    #[serde(default)]
    pub retention: RetentionSettings,

    /// Folder watched by an external sync agent; empty or absent disables mirroring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_path: Option<PathBuf>,

    /// Scheduler sleep increment in seconds (bounds stop latency)
    #[serde(default = "default_scheduler_tick_secs")]
    pub scheduler_tick_secs: u64,
}

fn default_schema_version() -> u32 {
    1
}

fn default_scheduler_tick_secs() -> u64 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            retention: RetentionSettings::default(),
            mirror_path: None,
            scheduler_tick_secs: default_scheduler_tick_secs(),
        }
    }
}

impl Settings {
    /// Configured mirror path, treating an empty path as unset
    pub fn mirror_path(&self) -> Option<&Path> {
        self.mirror_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Whether a mirror location is available at all
    pub fn mirror_available(&self) -> bool {
        self.mirror_path().is_some()
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<(), GameSaveError> {
        if self.scheduler_tick_secs == 0 {
            return Err(GameSaveError::Validation(
                "scheduler_tick_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &GameSavePaths) -> Result<Self, GameSaveError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                GameSaveError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                GameSaveError::Json(format!("Failed to parse settings file: {}", e))
            })?;

            settings.validate()?;
            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &GameSavePaths) -> Result<(), GameSaveError> {
        self.validate()?;
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }
}
