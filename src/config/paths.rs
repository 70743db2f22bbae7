//! Path management for gamesave
//!
//! Resolves where settings, profiles and local backups live.
//!
//! ## Path Resolution Order
//!
//! 1. `GAMESAVE_DATA_DIR` environment variable (if set)
//! 2. The platform config directory reported by `directories`
//!    (`~/.config/gamesave` on Linux, `%APPDATA%\gamesave\config` on Windows)

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::GameSaveError;

/// Subfolder created under a configured mirror path to hold all mirrored archives
pub const MIRROR_SUBDIR: &str = "Game Save Backups";

/// Manages all paths used by gamesave
#[derive(Debug, Clone)]
pub struct GameSavePaths {
    /// Base directory for all gamesave data
    base_dir: PathBuf,
}

impl GameSavePaths {
    /// Create a new GameSavePaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no platform config directory can be determined.
    pub fn new() -> Result<Self, GameSaveError> {
        let base_dir = if let Ok(custom) = std::env::var("GAMESAVE_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            ProjectDirs::from("", "", "gamesave")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    GameSaveError::Config("Could not determine a home directory".into())
                })?
        };

        Ok(Self { base_dir })
    }

    /// Create GameSavePaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the profile store
    pub fn profiles_file(&self) -> PathBuf {
        self.base_dir.join("profiles.json")
    }

    /// Root of the local archive location (one subdirectory per profile)
    pub fn local_backup_root(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Ensure the base and local backup directories exist
    pub fn ensure_directories(&self) -> Result<(), GameSaveError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| GameSaveError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.local_backup_root()).map_err(|e| {
            GameSaveError::Io(format!("Failed to create backup directory: {}", e))
        })?;

        Ok(())
    }

    /// Check if gamesave has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Root of the mirror location for a configured mirror path
pub fn mirror_location_root(mirror_path: &Path) -> PathBuf {
    mirror_path.join(MIRROR_SUBDIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GameSavePaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.local_backup_root(), temp_dir.path().join("backups"));
        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(paths.profiles_file(), temp_dir.path().join("profiles.json"));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        let custom_path = temp_dir.path().to_str().unwrap();

        env::set_var("GAMESAVE_DATA_DIR", custom_path);
        let paths = GameSavePaths::new().unwrap();
        assert_eq!(paths.base_dir(), temp_dir.path());
        env::remove_var("GAMESAVE_DATA_DIR");
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GameSavePaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.base_dir().exists());
        assert!(paths.local_backup_root().exists());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_mirror_location_root() {
        let root = mirror_location_root(Path::new("/drive"));
        assert_eq!(root, PathBuf::from("/drive").join(MIRROR_SUBDIR));
    }
}
