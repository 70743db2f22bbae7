//! Storage layer for gamesave
//!
//! Persists game profiles as JSON with atomic writes. Archives themselves are
//! plain directory trees managed by the backup module, not by this layer.

pub mod file_io;
pub mod profiles;

pub use file_io::{read_json, write_json_atomic};
pub use profiles::ProfileRepository;

use crate::config::paths::GameSavePaths;
use crate::error::GameSaveError;

/// Main storage coordinator
pub struct Storage {
    paths: GameSavePaths,
    pub profiles: ProfileRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: GameSavePaths) -> Result<Self, GameSaveError> {
        paths.ensure_directories()?;

        Ok(Self {
            profiles: ProfileRepository::new(paths.profiles_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &GameSavePaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), GameSaveError> {
        self.profiles.load()
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), GameSaveError> {
        self.profiles.save()
    }
}
