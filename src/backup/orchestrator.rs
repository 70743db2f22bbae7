//! Backup orchestration
//!
//! One entry point for manual and scheduled backups. A run captures locally,
//! applies local retention, then mirrors the fresh local archive and applies
//! mirror retention. Runs for the same profile are serialized.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Local};
use tracing::{error, info, warn};

use crate::config::paths::GameSavePaths;
use crate::config::settings::{RetentionSettings, Settings};
use crate::error::{GameSaveError, GameSaveResult};
use crate::models::GameProfile;

use super::clock::{Clock, SystemClock};
use super::naming::{ArchiveClass, ArchiveIdentity};
use super::store::{BackupStore, RetentionPass};

/// Attempts to step past an existing archive name before giving up
const MAX_NAME_STEPS: u32 = 60;

const REPORT_STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One mutual-exclusion point per profile name
#[derive(Debug, Default)]
pub struct ProfileLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ProfileLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock guarding all archive writes for `profile_name`
    pub fn for_profile(&self, profile_name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(profile_name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Outcome of one backup run
#[derive(Debug)]
pub struct BackupReport {
    pub profile: String,
    pub class: ArchiveClass,
    /// Name shared by the local and mirror archive
    pub identity: ArchiveIdentity,
    pub started_at: DateTime<Local>,
    pub local_ok: bool,
    pub local_error: Option<String>,
    pub local_archive: Option<PathBuf>,
    pub mirror_attempted: bool,
    pub mirror_ok: bool,
    pub mirror_error: Option<String>,
    /// Informational purge lines for both locations
    pub purge_lines: Vec<String>,
    /// Archives that retention selected but could not delete
    pub purge_failures: usize,
}

impl BackupReport {
    fn new(profile: &GameProfile, identity: ArchiveIdentity, started_at: DateTime<Local>) -> Self {
        Self {
            profile: profile.name.clone(),
            class: identity.class(),
            identity,
            started_at,
            local_ok: false,
            local_error: None,
            local_archive: None,
            mirror_attempted: false,
            mirror_ok: false,
            mirror_error: None,
            purge_lines: Vec::new(),
            purge_failures: 0,
        }
    }

    /// One-line outcome of the run
    pub fn summary_line(&self) -> String {
        let stamp = self.started_at.format(REPORT_STAMP_FORMAT);
        let letter = self.class.letter();

        if !self.local_ok {
            return format!(
                "[{}] [{}] Local backup FAILED for {}: {}",
                stamp,
                letter,
                self.identity,
                self.local_error.as_deref().unwrap_or("unknown error")
            );
        }

        let outcome = match (self.mirror_attempted, self.mirror_ok) {
            (true, true) => "(Local + Mirror).".to_string(),
            (true, false) => format!(
                "(Local only, mirror failed: {}).",
                self.mirror_error.as_deref().unwrap_or("unknown error")
            ),
            (false, _) => "(Local).".to_string(),
        };
        format!(
            "[{}] [{}] Backup {} completed {}",
            stamp, letter, self.identity, outcome
        )
    }

    /// Purge lines to print after the summary
    pub fn detail_lines(&self) -> &[String] {
        &self.purge_lines
    }

    fn absorb(&mut self, profile_name: &str, store: &BackupStore, pass: GameSaveResult<RetentionPass>) {
        match pass {
            Ok(pass) => {
                self.purge_lines.extend(pass.describe());
                if let Some(incomplete) = pass.incomplete() {
                    warn!(profile = profile_name, location = %store.location(), "{}", incomplete);
                    self.purge_failures += pass.failed();
                }
            }
            Err(e) => {
                warn!(profile = profile_name, location = %store.location(), error = %e, "retention skipped");
                self.purge_lines
                    .push(format!("[PURGE:{}] Skipped: {}", store.location(), e));
            }
        }
    }
}

/// Coordinates one backup across the local and mirror stores
pub struct BackupOrchestrator {
    local: BackupStore,
    mirror: Option<BackupStore>,
    limits: RwLock<RetentionSettings>,
    clock: Arc<dyn Clock>,
    locks: Arc<ProfileLocks>,
}

impl BackupOrchestrator {
    pub fn new(local: BackupStore, mirror: Option<BackupStore>, limits: RetentionSettings) -> Self {
        Self {
            local,
            mirror,
            limits: RwLock::new(limits),
            clock: Arc::new(SystemClock),
            locks: Arc::new(ProfileLocks::new()),
        }
    }

    /// Orchestrator for the configured local and mirror locations
    pub fn from_settings(paths: &GameSavePaths, settings: &Settings) -> Self {
        Self::new(
            BackupStore::local(paths),
            BackupStore::mirror(settings),
            settings.retention,
        )
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_locks(mut self, locks: Arc<ProfileLocks>) -> Self {
        self.locks = locks;
        self
    }

    pub fn locks(&self) -> Arc<ProfileLocks> {
        Arc::clone(&self.locks)
    }

    pub fn local_store(&self) -> &BackupStore {
        &self.local
    }

    pub fn mirror_store(&self) -> Option<&BackupStore> {
        self.mirror.as_ref()
    }

    /// Current limits
    pub fn limits(&self) -> RetentionSettings {
        *self.limits.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the limits. A run already in progress keeps the limits it started with.
    pub fn update_limits(&self, limits: RetentionSettings) {
        *self.limits.write().unwrap_or_else(PoisonError::into_inner) = limits;
    }

    /// Apply retention at every configured location without capturing
    pub fn prune(&self, profile: &GameProfile) -> GameSaveResult<Vec<RetentionPass>> {
        let lock = self.locks.for_profile(&profile.name);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let limits = self.limits();
        let mut passes = vec![self.local.enforce_retention(&profile.name, &limits.local)?];
        if let Some(mirror) = &self.mirror {
            passes.push(mirror.enforce_retention(&profile.name, &limits.mirror)?);
        }
        Ok(passes)
    }

    /// Run one backup. Every failure is described in the returned report.
    pub fn run_backup(&self, profile: &GameProfile, class: ArchiveClass) -> BackupReport {
        let lock = self.locks.for_profile(&profile.name);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let started_at = self.clock.now();
        let limits = self.limits();
        let mirror = self.mirror.as_ref().filter(|_| profile.mirror_enabled);

        let mut report = BackupReport::new(
            profile,
            ArchiveIdentity::new(started_at, class),
            started_at,
        );

        match self.free_identity(&profile.name, report.identity.clone(), mirror) {
            Some(identity) => report.identity = identity,
            None => {
                report.local_error = Some(format!(
                    "no free archive name near {}",
                    report.identity
                ));
                error!(profile = %profile.name, "archive name collision");
                return report;
            }
        }

        if !profile.save_path.is_dir() {
            let err = GameSaveError::SourceUnavailable(profile.save_path.clone());
            error!(profile = %profile.name, error = %err, "local backup failed");
            report.local_error = Some(err.to_string());
            return report;
        }

        let local_archive = match self.local.capture(&profile.name, &profile.save_path, &report.identity) {
            Ok(path) => path,
            Err(e) => {
                error!(profile = %profile.name, archive = %report.identity, error = %e, "local backup failed");
                report.local_error = Some(e.to_string());
                return report;
            }
        };
        report.local_ok = true;

        let pass = self.local.enforce_retention_keeping(
            &profile.name,
            &limits.local,
            Some(&report.identity),
        );
        report.absorb(&profile.name, &self.local, pass);

        if let Some(mirror) = mirror {
            report.mirror_attempted = true;
            match mirror.capture(&profile.name, &local_archive, &report.identity) {
                Ok(_) => {
                    report.mirror_ok = true;
                    let pass = mirror.enforce_retention_keeping(
                        &profile.name,
                        &limits.mirror,
                        Some(&report.identity),
                    );
                    report.absorb(&profile.name, mirror, pass);
                }
                Err(e) => {
                    warn!(profile = %profile.name, archive = %report.identity, error = %e, "mirror copy failed");
                    report.mirror_error = Some(e.to_string());
                }
            }
        }

        report.local_archive = Some(local_archive);
        info!(
            profile = %profile.name,
            archive = %report.identity,
            mirror = report.mirror_ok,
            "backup completed"
        );
        report
    }

    fn free_identity(
        &self,
        profile_name: &str,
        mut identity: ArchiveIdentity,
        mirror: Option<&BackupStore>,
    ) -> Option<ArchiveIdentity> {
        for _ in 0..MAX_NAME_STEPS {
            let taken = self.local.contains(profile_name, &identity)
                || mirror.map_or(false, |m| m.contains(profile_name, &identity));
            if !taken {
                return Some(identity);
            }
            identity = identity.next_second()?;
        }
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::settings::RetentionLimits;
    use crate::models::Location;
    use chrono::TimeZone;
    use std::fs;
    use std::path::Path;
    use std::thread;
    use tempfile::TempDir;

    /// Clock that always answers the same instant
    pub(crate) struct FixedClock(pub DateTime<Local>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            self.0
        }
    }

    pub(crate) fn fixed_instant() -> DateTime<Local> {
        Local.timestamp_opt(1_735_689_600, 0).single().unwrap()
    }

    pub(crate) fn create_test_orchestrator(
        temp: &Path,
        with_mirror: bool,
        limits: RetentionSettings,
    ) -> BackupOrchestrator {
        let local = BackupStore::new(Location::Local, temp.join("local"));
        let mirror = with_mirror.then(|| BackupStore::new(Location::Mirror, temp.join("mirror")));
        BackupOrchestrator::new(local, mirror, limits)
    }

    pub(crate) fn create_test_profile(temp: &Path, mirror: bool) -> GameProfile {
        let save = temp.join("live");
        fs::create_dir_all(save.join("slot1")).unwrap();
        fs::write(save.join("slot1/world.sav"), b"chapter 3").unwrap();
        GameProfile::new("Hollow Knight", save).with_mirror(mirror)
    }

    fn unlimited() -> RetentionSettings {
        RetentionSettings {
            local: RetentionLimits::unlimited(),
            mirror: RetentionLimits::unlimited(),
        }
    }

    #[test]
    fn test_mirror_disabled_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let orchestrator = create_test_orchestrator(temp.path(), true, unlimited());
        let profile = create_test_profile(temp.path(), false);

        let report = orchestrator.run_backup(&profile, ArchiveClass::Manual);

        assert!(report.local_ok);
        assert!(!report.mirror_attempted);
        assert!(!temp.path().join("mirror").exists());
        assert!(report.summary_line().ends_with("completed (Local)."));
    }

    #[test]
    fn test_mirror_copy_matches_local_name() {
        let temp = TempDir::new().unwrap();
        let orchestrator = create_test_orchestrator(temp.path(), true, unlimited());
        let profile = create_test_profile(temp.path(), true);

        let report = orchestrator.run_backup(&profile, ArchiveClass::Auto);

        assert!(report.local_ok && report.mirror_ok);
        let mirror = orchestrator.mirror_store().unwrap();
        let mirrored = mirror.archive_path(&profile.name, &report.identity);
        assert_eq!(fs::read(mirrored.join("slot1/world.sav")).unwrap(), b"chapter 3");
        assert!(report.summary_line().ends_with("completed (Local + Mirror)."));
    }

    #[test]
    fn test_missing_source_reports_failure() {
        let temp = TempDir::new().unwrap();
        let orchestrator = create_test_orchestrator(temp.path(), true, unlimited());
        let profile = GameProfile::new("Ghost", temp.path().join("nope")).with_mirror(true);

        let report = orchestrator.run_backup(&profile, ArchiveClass::Manual);

        assert!(!report.local_ok);
        assert!(!report.mirror_attempted);
        assert!(report.summary_line().contains("Local backup FAILED"));
        assert!(orchestrator.local_store().list_archives("Ghost").unwrap().is_empty());
        assert!(!temp.path().join("mirror").exists());
    }

    #[test]
    fn test_limits_applied_per_location() {
        let temp = TempDir::new().unwrap();
        let limits = RetentionSettings {
            local: RetentionLimits::new(3, 0),
            mirror: RetentionLimits::new(1, 0),
        };
        let orchestrator = create_test_orchestrator(temp.path(), true, limits)
            .with_clock(Arc::new(FixedClock(fixed_instant())));
        let profile = create_test_profile(temp.path(), true);

        for _ in 0..4 {
            assert!(orchestrator.run_backup(&profile, ArchiveClass::Auto).mirror_ok);
        }

        let local = orchestrator.local_store().list_archives(&profile.name).unwrap();
        let mirror = orchestrator
            .mirror_store()
            .unwrap()
            .list_archives(&profile.name)
            .unwrap();
        assert_eq!(local.len(), 3);
        assert_eq!(mirror.len(), 1);
        assert_eq!(mirror[0], *local.last().unwrap());
    }

    #[test]
    fn test_limit_change_applies_to_next_run() {
        let temp = TempDir::new().unwrap();
        let orchestrator = create_test_orchestrator(temp.path(), false, unlimited())
            .with_clock(Arc::new(FixedClock(fixed_instant())));
        let profile = create_test_profile(temp.path(), false);

        for _ in 0..3 {
            orchestrator.run_backup(&profile, ArchiveClass::Manual);
        }
        orchestrator.update_limits(RetentionSettings {
            local: RetentionLimits::new(0, 1),
            mirror: RetentionLimits::unlimited(),
        });
        let report = orchestrator.run_backup(&profile, ArchiveClass::Manual);

        assert_eq!(report.detail_lines().len(), 4);
        assert_eq!(
            orchestrator.local_store().list_archives(&profile.name).unwrap(),
            vec![report.identity]
        );
    }

    #[test]
    fn test_same_second_same_class_steps_forward() {
        let temp = TempDir::new().unwrap();
        let orchestrator = create_test_orchestrator(temp.path(), false, unlimited())
            .with_clock(Arc::new(FixedClock(fixed_instant())));
        let profile = create_test_profile(temp.path(), false);

        let first = orchestrator.run_backup(&profile, ArchiveClass::Manual);
        let second = orchestrator.run_backup(&profile, ArchiveClass::Manual);

        assert_eq!(second.identity.epoch_secs(), first.identity.epoch_secs() + 1);
        assert_eq!(
            orchestrator.local_store().list_archives(&profile.name).unwrap().len(),
            2
        );
    }

    #[test]
    fn test_concurrent_manual_and_auto_never_collide() {
        let temp = TempDir::new().unwrap();
        let orchestrator = Arc::new(
            create_test_orchestrator(temp.path(), false, unlimited())
                .with_clock(Arc::new(FixedClock(fixed_instant()))),
        );
        let profile = create_test_profile(temp.path(), false);

        let handles: Vec<_> = [ArchiveClass::Auto, ArchiveClass::Manual, ArchiveClass::Manual]
            .into_iter()
            .map(|class| {
                let orchestrator = Arc::clone(&orchestrator);
                let profile = profile.clone();
                thread::spawn(move || orchestrator.run_backup(&profile, class))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().local_ok);
        }

        let archives = orchestrator.local_store().list_archives(&profile.name).unwrap();
        assert_eq!(archives.len(), 3);
        assert_eq!(
            archives.iter().filter(|a| a.class() == ArchiveClass::Auto).count(),
            1
        );
        for archive in &archives {
            let path = orchestrator.local_store().archive_path(&profile.name, archive);
            assert_eq!(fs::read(path.join("slot1/world.sav")).unwrap(), b"chapter 3");
        }
    }

    #[test]
    fn test_mirror_failure_keeps_local_success() {
        let temp = TempDir::new().unwrap();
        // A file where the mirror root should be makes every mirror capture fail
        fs::write(temp.path().join("mirror"), b"not a directory").unwrap();
        let orchestrator = create_test_orchestrator(temp.path(), true, unlimited());
        let profile = create_test_profile(temp.path(), true);

        let report = orchestrator.run_backup(&profile, ArchiveClass::Manual);

        assert!(report.local_ok);
        assert!(report.mirror_attempted);
        assert!(!report.mirror_ok);
        assert!(report.summary_line().contains("Local only, mirror failed"));
        assert_eq!(
            orchestrator.local_store().list_archives(&profile.name).unwrap().len(),
            1
        );
    }

    #[test]
    fn test_profile_locks_are_shared_per_name() {
        let locks = ProfileLocks::new();
        assert!(Arc::ptr_eq(&locks.for_profile("a"), &locks.for_profile("a")));
        assert!(!Arc::ptr_eq(&locks.for_profile("a"), &locks.for_profile("b")));
    }

    #[test]
    fn test_prune_without_capture() {
        let temp = TempDir::new().unwrap();
        let orchestrator = create_test_orchestrator(temp.path(), true, unlimited())
            .with_clock(Arc::new(FixedClock(fixed_instant())));
        let profile = create_test_profile(temp.path(), true);
        for _ in 0..3 {
            orchestrator.run_backup(&profile, ArchiveClass::Auto);
        }

        orchestrator.update_limits(RetentionSettings {
            local: RetentionLimits::new(2, 0),
            mirror: RetentionLimits::new(1, 0),
        });
        let passes = orchestrator.prune(&profile).unwrap();

        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].attempted(), 1);
        assert_eq!(passes[1].attempted(), 2);
        assert_eq!(
            orchestrator.local_store().list_archives(&profile.name).unwrap().len(),
            2
        );
    }

    #[test]
    fn test_fresh_archive_survives_when_clock_runs_behind() {
        let temp = TempDir::new().unwrap();
        let limits = RetentionSettings {
            local: RetentionLimits::new(1, 0),
            mirror: RetentionLimits::new(1, 0),
        };
        let orchestrator = create_test_orchestrator(temp.path(), true, limits)
            .with_clock(Arc::new(FixedClock(fixed_instant())));
        let profile = create_test_profile(temp.path(), true);

        // An archive stamped after "now", as left behind before the clock moved back
        let newer = ArchiveIdentity::new(fixed_instant() + chrono::Duration::seconds(100), ArchiveClass::Auto);
        orchestrator
            .local_store()
            .capture(&profile.name, &profile.save_path, &newer)
            .unwrap();
        orchestrator
            .mirror_store()
            .unwrap()
            .capture(&profile.name, &profile.save_path, &newer)
            .unwrap();

        let report = orchestrator.run_backup(&profile, ArchiveClass::Auto);

        assert!(report.local_ok);
        assert!(report.mirror_ok, "{:?}", report.mirror_error);
        assert_eq!(
            orchestrator.local_store().list_archives(&profile.name).unwrap(),
            vec![report.identity.clone()]
        );
        assert_eq!(
            orchestrator
                .mirror_store()
                .unwrap()
                .list_archives(&profile.name)
                .unwrap(),
            vec![report.identity.clone()]
        );
        assert!(report.local_archive.unwrap().join("slot1/world.sav").exists());
    }
}
