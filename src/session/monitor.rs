//! Monitoring session
//!
//! Runs the scheduler for one profile on a background thread while the
//! foreground thread waits for triggers. Every exit path, including errors
//! from the event source and termination signals, stops and joins the
//! scheduler before returning.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tracing::{info, warn};

use crate::backup::{
    ArchiveClass, ArchiveIdentity, AutoSaveScheduler, BackupOrchestrator, CancellationToken,
    ReportSink, RestoreOutcome, RestoreSelector,
};
use crate::display::{emit, format_age, format_interval, format_size};
use crate::error::{GameSaveError, GameSaveResult};
use crate::models::{GameProfile, Location};

use super::event::{EventSource, TriggerKind};
use super::signal::TerminationSignal;

/// Counters for a finished session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub manual_backups: usize,
    pub restores: usize,
}

/// Foreground loop of a monitoring session
pub struct MonitorSession {
    orchestrator: Arc<BackupOrchestrator>,
    restore: RestoreSelector,
    tick: Duration,
    sink: Arc<dyn ReportSink>,
    termination: TerminationSignal,
}

impl MonitorSession {
    pub fn new(orchestrator: Arc<BackupOrchestrator>, tick: Duration, sink: Arc<dyn ReportSink>) -> Self {
        let restore = RestoreSelector::for_orchestrator(&orchestrator);
        Self {
            orchestrator,
            restore,
            tick,
            sink,
            termination: TerminationSignal::new(),
        }
    }

    /// End the session when `termination` is raised
    pub fn with_termination(mut self, termination: TerminationSignal) -> Self {
        self.termination = termination;
        self
    }

    /// Monitor `profile` until a Stop trigger arrives
    pub fn run(
        &self,
        profile: &GameProfile,
        events: &mut dyn EventSource,
    ) -> GameSaveResult<SessionSummary> {
        if !profile.save_path.is_dir() {
            return Err(GameSaveError::SourceUnavailable(profile.save_path.clone()));
        }
        let profile_dir = self.orchestrator.local_store().profile_dir(&profile.name);
        fs::create_dir_all(&profile_dir).map_err(|e| {
            GameSaveError::Io(format!("Failed to create {}: {}", profile_dir.display(), e))
        })?;

        let mut scheduler =
            AutoSaveScheduler::new(Arc::clone(&self.orchestrator), self.tick, Arc::clone(&self.sink));
        scheduler.start(profile.clone(), CancellationToken::new())?;
        info!(profile = %profile.name, "monitoring started");

        emit(&format!(
            "Monitoring {} (auto-save every {}).",
            profile.name,
            format_interval(profile.auto_save_interval_secs)
        ));
        emit("Keys: [b] backup  [r] restore latest manual  [l] list and restore  [q] stop");

        let mut summary = SessionSummary::default();
        let result = loop {
            if self.termination.is_requested() {
                emit("Termination requested.");
                break Ok(summary);
            }
            let trigger = match events.next_trigger() {
                Ok(_) if self.termination.is_requested() => continue,
                Ok(trigger) => trigger,
                Err(e) => break Err(e),
            };
            match trigger {
                TriggerKind::ManualBackup => {
                    let report = self.orchestrator.run_backup(profile, ArchiveClass::Manual);
                    self.sink.deliver(report);
                    summary.manual_backups += 1;
                }
                TriggerKind::RestoreLatestManual => {
                    emit("Restoring latest manual backup...");
                    if self.report_restore(self.restore.restore_latest_manual(profile)) {
                        summary.restores += 1;
                    }
                }
                TriggerKind::ListAndRestore => match self.list_and_restore(profile, events) {
                    Ok(true) => summary.restores += 1,
                    Ok(false) => {}
                    Err(e) => break Err(e),
                },
                TriggerKind::Stop => break Ok(summary),
            }
        };

        emit("Stopping auto-save...");
        scheduler.stop();
        info!(profile = %profile.name, "monitoring stopped");
        result
    }

    fn report_restore(&self, result: GameSaveResult<RestoreOutcome>) -> bool {
        match result {
            Ok(outcome) => {
                emit(&format!(
                    "{} [{}]",
                    outcome.summary_line(),
                    format_size(outcome.stats.bytes)
                ));
                true
            }
            Err(e) => {
                warn!(error = %e, "restore failed");
                emit(&format!("RESTORE FAILED: {}", e));
                false
            }
        }
    }

    /// Show local then mirror archives and restore the chosen one after confirmation
    fn list_and_restore(
        &self,
        profile: &GameProfile,
        events: &mut dyn EventSource,
    ) -> GameSaveResult<bool> {
        let mut choices: Vec<(Location, ArchiveIdentity)> = Vec::new();
        let mut locations = vec![Location::Local];
        if profile.mirror_enabled {
            locations.push(Location::Mirror);
        }
        for location in locations {
            for identity in self.restore.list_for_display(location, &profile.name)? {
                choices.push((location, identity));
            }
        }

        if choices.is_empty() {
            emit(&format!("No archives found for {}.", profile.name));
            return Ok(false);
        }

        let now = Local::now();
        for (i, (location, identity)) in choices.iter().enumerate() {
            let age = identity
                .created_at()
                .map(|created| format_age(now.signed_duration_since(created)))
                .unwrap_or_default();
            emit(&format!("{:>3}. [{}] {} ({} ago)", i + 1, location, identity, age));
        }

        let answer = events.prompt("Archive number to restore (Enter to cancel): ")?;
        let Some((location, identity)) = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| choices.get(i))
        else {
            emit("Restore cancelled.");
            return Ok(false);
        };

        let confirm = events.prompt(&format!(
            "Overwrite {} with {}? (y/N): ",
            profile.save_path.display(),
            identity
        ))?;
        if !confirm.eq_ignore_ascii_case("y") {
            emit("Restore cancelled.");
            return Ok(false);
        }

        Ok(self.report_restore(self.restore.restore_chosen(profile, *location, identity)))
    }
}
