//! Profile service
//!
//! Provides the profile workflows: creation with validation, edits that keep
//! archive trees in step with renames, and deletion that can also remove a
//! profile's archives at each location.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::backup::BackupStore;
use crate::config::settings::Settings;
use crate::error::{GameSaveError, GameSaveResult};
use crate::models::{GameProfile, DEFAULT_AUTO_SAVE_INTERVAL_SECS};
use crate::storage::Storage;

/// Fields to change on an existing profile; `None` leaves a field as it is
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub save_path: Option<PathBuf>,
    pub auto_save_interval_secs: Option<u64>,
    pub mirror_enabled: Option<bool>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.save_path.is_none()
            && self.auto_save_interval_secs.is_none()
            && self.mirror_enabled.is_none()
    }
}

/// What a profile deletion removed
#[derive(Debug)]
pub struct ProfileDeletion {
    pub profile: GameProfile,
    pub local_removed: bool,
    pub mirror_removed: bool,
}

/// Service for profile management
pub struct ProfileService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
}

impl<'a> ProfileService<'a> {
    /// Create a new profile service
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self { storage, settings }
    }

    /// Create a new profile
    pub fn create(
        &self,
        name: &str,
        save_path: impl Into<PathBuf>,
        interval_secs: Option<u64>,
        mirror_enabled: bool,
    ) -> GameSaveResult<GameProfile> {
        let name = name.trim();

        if self.storage.profiles.get(name)?.is_some() {
            return Err(GameSaveError::Duplicate {
                entity_type: "Profile",
                identifier: name.to_string(),
            });
        }

        let mirror_enabled = self.mirror_flag(mirror_enabled);
        let profile = GameProfile::new(name, save_path)
            .with_interval(interval_secs.unwrap_or(DEFAULT_AUTO_SAVE_INTERVAL_SECS))
            .with_mirror(mirror_enabled);

        profile
            .validate()
            .map_err(|e| GameSaveError::Validation(e.to_string()))?;

        self.storage.profiles.upsert(profile.clone())?;
        self.storage.profiles.save()?;

        info!(profile = %profile.name, "profile created");
        Ok(profile)
    }

    /// Get a profile by name
    pub fn get(&self, name: &str) -> GameSaveResult<Option<GameProfile>> {
        self.storage.profiles.get(name.trim())
    }

    /// Get a profile by name, failing if it does not exist
    pub fn require(&self, name: &str) -> GameSaveResult<GameProfile> {
        self.get(name)?
            .ok_or_else(|| GameSaveError::profile_not_found(name.trim()))
    }

    /// List all profiles
    pub fn list(&self) -> GameSaveResult<Vec<GameProfile>> {
        self.storage.profiles.get_all()
    }

    /// Apply an edit. A rename moves the profile's archives at every location.
    pub fn update(&self, name: &str, update: ProfileUpdate) -> GameSaveResult<GameProfile> {
        let before = self.require(name)?;
        let mut profile = before.clone();

        if let Some(new_name) = &update.name {
            profile.name = new_name.trim().to_string();
        }
        if let Some(path) = update.save_path {
            profile.save_path = path;
        }
        if let Some(secs) = update.auto_save_interval_secs {
            profile.auto_save_interval_secs = secs;
        }
        if let Some(enabled) = update.mirror_enabled {
            profile.mirror_enabled = self.mirror_flag(enabled);
        }

        profile
            .validate()
            .map_err(|e| GameSaveError::Validation(e.to_string()))?;

        let renamed = profile.name != before.name;
        if renamed {
            if self.storage.profiles.get(&profile.name)?.is_some() {
                return Err(GameSaveError::Duplicate {
                    entity_type: "Profile",
                    identifier: profile.name.clone(),
                });
            }
            self.move_archives(&before.name, &profile.name)?;
            self.storage.profiles.delete(&before.name)?;
        }

        profile.touch();
        self.storage.profiles.upsert(profile.clone())?;
        self.storage.profiles.save()?;

        info!(profile = %profile.name, renamed, "profile updated");
        Ok(profile)
    }

    /// Delete a profile record, optionally removing its archives
    pub fn delete(
        &self,
        name: &str,
        purge_local: bool,
        purge_mirror: bool,
    ) -> GameSaveResult<ProfileDeletion> {
        let profile = self.require(name)?;

        let local_removed = if purge_local {
            self.local_store().remove_profile_tree(&profile.name)?
        } else {
            false
        };
        let mirror_removed = match (purge_mirror, self.mirror_store()) {
            (true, Some(mirror)) => mirror.remove_profile_tree(&profile.name)?,
            _ => false,
        };

        self.storage.profiles.delete(&profile.name)?;
        self.storage.profiles.save()?;

        info!(profile = %profile.name, local_removed, mirror_removed, "profile deleted");
        Ok(ProfileDeletion {
            profile,
            local_removed,
            mirror_removed,
        })
    }

    fn mirror_flag(&self, requested: bool) -> bool {
        if requested && !self.settings.mirror_available() {
            warn!("no mirror path is configured, mirroring stays off");
            return false;
        }
        requested
    }

    fn local_store(&self) -> BackupStore {
        BackupStore::local(self.storage.paths())
    }

    fn mirror_store(&self) -> Option<BackupStore> {
        BackupStore::mirror(self.settings)
    }

    fn move_archives(&self, from: &str, to: &str) -> GameSaveResult<()> {
        let local = self.local_store();
        local.rename_profile_tree(from, to)?;

        if let Some(mirror) = self.mirror_store() {
            if let Err(e) = mirror.rename_profile_tree(from, to) {
                // Put the local tree back so both locations keep the old name
                if let Err(undo) = local.rename_profile_tree(to, from) {
                    warn!(error = %undo, "could not undo local archive rename");
                }
                return Err(e);
            }
        }
        Ok(())
    }
}
