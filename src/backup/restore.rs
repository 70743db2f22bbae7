//! Archive restoration
//!
//! Restore clears the live save directory and copies an archive's contents
//! into it. The two steps are not atomic: if the process dies between them the
//! live directory is left empty or partially populated. The archive itself is
//! only ever read.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError};

use tracing::{info, warn};

use crate::error::{GameSaveError, GameSaveResult};
use crate::models::{GameProfile, Location};

use super::copy::{clear_dir_contents, copy_tree, CopyStats};
use super::naming::{ArchiveClass, ArchiveIdentity};
use super::orchestrator::{BackupOrchestrator, ProfileLocks};
use super::store::BackupStore;

/// What a successful restore did
#[derive(Debug, Clone)]
pub struct RestoreOutcome {
    pub location: Location,
    pub identity: ArchiveIdentity,
    pub live_dir: PathBuf,
    pub stats: CopyStats,
    /// The live directory did not exist and was created
    pub created_live_dir: bool,
}

impl RestoreOutcome {
    pub fn summary_line(&self) -> String {
        format!(
            "Restored {} from {} to {} ({} file(s)).",
            self.identity,
            self.location,
            self.live_dir.display(),
            self.stats.files
        )
    }
}

/// Lists archives per location and restores them over the live directory
pub struct RestoreSelector {
    local: BackupStore,
    mirror: Option<BackupStore>,
    locks: Arc<ProfileLocks>,
}

impl RestoreSelector {
    pub fn new(local: BackupStore, mirror: Option<BackupStore>, locks: Arc<ProfileLocks>) -> Self {
        Self {
            local,
            mirror,
            locks,
        }
    }

    /// Selector sharing an orchestrator's stores and profile locks
    pub fn for_orchestrator(orchestrator: &BackupOrchestrator) -> Self {
        Self::new(
            orchestrator.local_store().clone(),
            orchestrator.mirror_store().cloned(),
            orchestrator.locks(),
        )
    }

    pub fn store(&self, location: Location) -> Option<&BackupStore> {
        match location {
            Location::Local => Some(&self.local),
            Location::Mirror => self.mirror.as_ref(),
        }
    }

    /// Archives at `location`, newest first. An unconfigured mirror lists nothing.
    pub fn list_for_display(
        &self,
        location: Location,
        profile_name: &str,
    ) -> GameSaveResult<Vec<ArchiveIdentity>> {
        let Some(store) = self.store(location) else {
            return Ok(Vec::new());
        };
        let mut archives = store.list_archives(profile_name)?;
        archives.reverse();
        Ok(archives)
    }

    /// Newest Manual archive at the local location
    pub fn latest_manual(&self, profile_name: &str) -> GameSaveResult<Option<ArchiveIdentity>> {
        Ok(self
            .local
            .list_archives(profile_name)?
            .into_iter()
            .filter(|a| a.class() == ArchiveClass::Manual)
            .max())
    }

    /// Restore the newest local Manual archive without prompting
    pub fn restore_latest_manual(&self, profile: &GameProfile) -> GameSaveResult<RestoreOutcome> {
        let identity = self
            .latest_manual(&profile.name)?
            .ok_or_else(|| GameSaveError::NoManualArchive(profile.name.clone()))?;
        self.restore_chosen(profile, Location::Local, &identity)
    }

    /// Restore a specific archive. Confirmation is the caller's job.
    pub fn restore_chosen(
        &self,
        profile: &GameProfile,
        location: Location,
        identity: &ArchiveIdentity,
    ) -> GameSaveResult<RestoreOutcome> {
        let store = self.store(location).ok_or_else(|| {
            GameSaveError::Config("no mirror path is configured".into())
        })?;

        let lock = self.locks.for_profile(&profile.name);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let archive = store.archive_path(&profile.name, identity);
        if !archive.is_dir() {
            if store.list_archives(&profile.name)?.is_empty() {
                return Err(GameSaveError::NoArchivesFound(format!(
                    "{} at {}",
                    profile.name, location
                )));
            }
            return Err(GameSaveError::archive_not_found(identity.name()));
        }

        let live_dir = profile.save_path.clone();
        let mut created_live_dir = false;
        if live_dir.exists() {
            if !live_dir.is_dir() {
                return Err(GameSaveError::SourceUnavailable(live_dir));
            }
        } else {
            fs::create_dir_all(&live_dir).map_err(|e| {
                GameSaveError::RestoreFailed(format!("{}: {}", live_dir.display(), e))
            })?;
            created_live_dir = true;
        }

        info!(profile = %profile.name, location = %location, archive = %identity, "restoring archive");
        if let Err(e) = clear_dir_contents(&live_dir) {
            warn!(profile = %profile.name, error = %e, "could not clear live directory");
            return Err(GameSaveError::RestoreFailed(e.to_string()));
        }
        let stats = copy_tree(&archive, &live_dir).map_err(|e| {
            warn!(profile = %profile.name, error = %e, "restore copy interrupted");
            GameSaveError::RestoreFailed(e.to_string())
        })?;

        Ok(RestoreOutcome {
            location,
            identity: identity.clone(),
            live_dir,
            stats,
            created_live_dir,
        })
    }
}
