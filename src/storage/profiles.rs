//! Profile repository for JSON storage
//!
//! Manages loading and saving game profiles to profiles.json

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::GameSaveError;
use crate::models::GameProfile;

use super::file_io::{read_json, write_json_atomic};

/// Serializable profile data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ProfileData {
    profiles: Vec<GameProfile>,
}

/// Repository for profile persistence, keyed by profile name
pub struct ProfileRepository {
    path: PathBuf,
    data: RwLock<BTreeMap<String, GameProfile>>,
}

impl ProfileRepository {
    /// Create a new profile repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(BTreeMap::new()),
        }
    }

    /// Load profiles from disk. Records without a name or save path are skipped.
    pub fn load(&self) -> Result<(), GameSaveError> {
        let file_data: ProfileData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            GameSaveError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        for profile in file_data.profiles {
            if profile.name.is_empty() || profile.save_path.as_os_str().is_empty() {
                continue;
            }
            data.insert(profile.name.clone(), profile);
        }

        Ok(())
    }

    /// Save profiles to disk
    pub fn save(&self) -> Result<(), GameSaveError> {
        let data = self.data.read().map_err(|e| {
            GameSaveError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let file_data = ProfileData {
            profiles: data.values().cloned().collect(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    /// Get a profile by exact name
    pub fn get(&self, name: &str) -> Result<Option<GameProfile>, GameSaveError> {
        let data = self.data.read().map_err(|e| {
            GameSaveError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(name).cloned())
    }

    /// Get all profiles, sorted by name
    pub fn get_all(&self) -> Result<Vec<GameProfile>, GameSaveError> {
        let data = self.data.read().map_err(|e| {
            GameSaveError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.values().cloned().collect())
    }

    /// Insert or update a profile
    pub fn upsert(&self, profile: GameProfile) -> Result<(), GameSaveError> {
        let mut data = self.data.write().map_err(|e| {
            GameSaveError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.insert(profile.name.clone(), profile);
        Ok(())
    }

    /// Delete a profile, returning it if it existed
    pub fn delete(&self, name: &str) -> Result<Option<GameProfile>, GameSaveError> {
        let mut data = self.data.write().map_err(|e| {
            GameSaveError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(data.remove(name))
    }

    /// Number of stored profiles
    pub fn count(&self) -> Result<usize, GameSaveError> {
        let data = self.data.read().map_err(|e| {
            GameSaveError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.len())
    }
}
