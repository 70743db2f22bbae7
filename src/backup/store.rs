//! Archive storage for one location
//!
//! A location root holds one directory per profile, and each profile directory
//! holds archive directories named by [`ArchiveIdentity`]. Only well-formed
//! archive names are ever listed or deleted, so anything else a user keeps in
//! a profile directory is left alone.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::paths::{mirror_location_root, GameSavePaths};
use crate::config::settings::{RetentionLimits, Settings};
use crate::error::{GameSaveError, GameSaveResult};
use crate::models::Location;

use super::copy::{copy_tree, CopyStats};
use super::naming::{ArchiveClass, ArchiveIdentity};
use super::retention::RetentionPlan;

/// Result of deleting one archive
#[derive(Debug)]
pub struct PurgeOutcome {
    pub identity: ArchiveIdentity,
    pub result: GameSaveResult<()>,
}

impl PurgeOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// One retention run at one location
#[derive(Debug)]
pub struct RetentionPass {
    pub location: Location,
    pub limits: RetentionLimits,
    pub plan: RetentionPlan,
    pub outcomes: Vec<PurgeOutcome>,
}

impl RetentionPass {
    /// Number of archives selected for deletion
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of archives that could not be deleted
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_ok()).count()
    }

    /// `PurgeFailed` if any deletion failed
    pub fn incomplete(&self) -> Option<GameSaveError> {
        match self.failed() {
            0 => None,
            failed => Some(GameSaveError::PurgeFailed {
                failed,
                attempted: self.attempted(),
            }),
        }
    }

    /// Human-readable purge lines, one summary per class followed by one line per archive
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (class, limit, selected) in [
            (ArchiveClass::Auto, self.limits.auto_limit, &self.plan.auto),
            (ArchiveClass::Manual, self.limits.manual_limit, &self.plan.manual),
        ] {
            if selected.is_empty() {
                continue;
            }
            lines.push(format!(
                "[PURGE:{}] {}-save limit ({}) exceeded. Deleting {} oldest...",
                self.location,
                class,
                limit,
                selected.len()
            ));
            for outcome in self.outcomes.iter().filter(|o| o.identity.class() == class) {
                match &outcome.result {
                    Ok(()) => lines.push(format!("   - Deleted: {}", outcome.identity)),
                    Err(e) => lines.push(format!(
                        "   - FAILED to delete {} {}: {}",
                        class, outcome.identity, e
                    )),
                }
            }
        }
        lines
    }
}

/// Capture and purge operations against one location root
#[derive(Debug, Clone)]
pub struct BackupStore {
    location: Location,
    root: PathBuf,
}

impl BackupStore {
    pub fn new(location: Location, root: impl Into<PathBuf>) -> Self {
        Self {
            location,
            root: root.into(),
        }
    }

    /// The local location under the gamesave data directory
    pub fn local(paths: &GameSavePaths) -> Self {
        Self::new(Location::Local, paths.local_backup_root())
    }

    /// The mirror location, if a mirror path is configured
    pub fn mirror(settings: &Settings) -> Option<Self> {
        settings
            .mirror_path()
            .map(|p| Self::new(Location::Mirror, mirror_location_root(p)))
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding all archives of a profile
    pub fn profile_dir(&self, profile_name: &str) -> PathBuf {
        self.root.join(profile_name)
    }

    pub fn archive_path(&self, profile_name: &str, identity: &ArchiveIdentity) -> PathBuf {
        self.profile_dir(profile_name).join(identity.name())
    }

    pub fn contains(&self, profile_name: &str, identity: &ArchiveIdentity) -> bool {
        self.archive_path(profile_name, identity).exists()
    }

    /// Copy `source_dir` into a new archive directory.
    ///
    /// On failure no partial archive is left behind when cleanup succeeds. An
    /// existing archive with the same name is never touched.
    pub fn capture(
        &self,
        profile_name: &str,
        source_dir: &Path,
        identity: &ArchiveIdentity,
    ) -> GameSaveResult<PathBuf> {
        if !source_dir.is_dir() {
            return Err(GameSaveError::CaptureFailed(format!(
                "source directory not found: {}",
                source_dir.display()
            )));
        }

        let profile_dir = self.profile_dir(profile_name);
        fs::create_dir_all(&profile_dir).map_err(|e| {
            GameSaveError::CaptureFailed(format!("{}: {}", profile_dir.display(), e))
        })?;

        let target = profile_dir.join(identity.name());
        fs::create_dir(&target).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => {
                GameSaveError::CaptureFailed(format!("archive {} already exists", identity))
            }
            _ => GameSaveError::CaptureFailed(format!("{}: {}", target.display(), e)),
        })?;

        match copy_tree(source_dir, &target) {
            Ok(CopyStats { files, bytes }) => {
                info!(
                    location = %self.location,
                    profile = profile_name,
                    archive = %identity,
                    files,
                    bytes,
                    "archive captured"
                );
                Ok(target)
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_dir_all(&target) {
                    warn!(
                        location = %self.location,
                        archive = %identity,
                        error = %cleanup,
                        "could not remove partial archive"
                    );
                }
                Err(GameSaveError::CaptureFailed(e.to_string()))
            }
        }
    }

    /// All archives of a profile, oldest first.
    ///
    /// A missing profile directory or location root is an empty listing.
    pub fn list_archives(&self, profile_name: &str) -> GameSaveResult<Vec<ArchiveIdentity>> {
        let profile_dir = self.profile_dir(profile_name);
        if !profile_dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&profile_dir).map_err(|e| {
            GameSaveError::Io(format!("Failed to read {}: {}", profile_dir.display(), e))
        })?;

        let mut archives = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                GameSaveError::Io(format!("Failed to read directory entry: {}", e))
            })?;
            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let name = entry.file_name();
            match name.to_str().and_then(ArchiveIdentity::parse) {
                Some(identity) => archives.push(identity),
                None => debug!(entry = ?name, "skipping non-archive directory"),
            }
        }

        archives.sort();
        Ok(archives)
    }

    /// Delete each archive. A failure on one entry never stops the others.
    pub fn purge(&self, profile_name: &str, to_delete: &[ArchiveIdentity]) -> Vec<PurgeOutcome> {
        to_delete
            .iter()
            .map(|identity| {
                let path = self.archive_path(profile_name, identity);
                let result = match fs::remove_dir_all(&path) {
                    Ok(()) => Ok(()),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                    Err(e) => Err(GameSaveError::Io(e.to_string())),
                };
                match &result {
                    Ok(()) => debug!(location = %self.location, archive = %identity, "archive purged"),
                    Err(e) => warn!(
                        location = %self.location,
                        archive = %identity,
                        error = %e,
                        "failed to purge archive"
                    ),
                }
                PurgeOutcome {
                    identity: identity.clone(),
                    result,
                }
            })
            .collect()
    }

    /// List, plan and purge one profile against this location's limits
    pub fn enforce_retention(
        &self,
        profile_name: &str,
        limits: &RetentionLimits,
    ) -> GameSaveResult<RetentionPass> {
        self.enforce_retention_keeping(profile_name, limits, None)
    }

    /// Retention that never deletes `keep`, such as the archive just captured
    pub fn enforce_retention_keeping(
        &self,
        profile_name: &str,
        limits: &RetentionLimits,
        keep: Option<&ArchiveIdentity>,
    ) -> GameSaveResult<RetentionPass> {
        let archives = self.list_archives(profile_name)?;
        let plan = RetentionPlan::build_keeping(&archives, limits, keep);

        let mut outcomes = self.purge(profile_name, &plan.auto);
        outcomes.extend(self.purge(profile_name, &plan.manual));

        if !plan.is_empty() {
            info!(
                location = %self.location,
                profile = profile_name,
                auto = plan.auto.len(),
                manual = plan.manual.len(),
                "retention applied"
            );
        }

        Ok(RetentionPass {
            location: self.location,
            limits: *limits,
            plan,
            outcomes,
        })
    }

    /// Remove a profile's entire archive tree. Returns false if there was none.
    pub fn remove_profile_tree(&self, profile_name: &str) -> GameSaveResult<bool> {
        let profile_dir = self.profile_dir(profile_name);
        if !profile_dir.exists() {
            return Ok(false);
        }

        fs::remove_dir_all(&profile_dir).map_err(|e| {
            GameSaveError::Io(format!(
                "Failed to delete {} backups at {}: {}",
                self.location,
                profile_dir.display(),
                e
            ))
        })?;
        info!(location = %self.location, profile = profile_name, "profile archives removed");
        Ok(true)
    }

    /// Move a profile's archive tree to a new profile name
    pub fn rename_profile_tree(&self, old_name: &str, new_name: &str) -> GameSaveResult<()> {
        let from = self.profile_dir(old_name);
        if !from.exists() {
            return Ok(());
        }

        let to = self.profile_dir(new_name);
        if to.exists() {
            return Err(GameSaveError::Duplicate {
                entity_type: "Archive directory",
                identifier: to.display().to_string(),
            });
        }

        fs::rename(&from, &to).map_err(|e| {
            GameSaveError::Io(format!(
                "Failed to move {} to {}: {}",
                from.display(),
                to.display(),
                e
            ))
        })
    }
}
