//! Watch command
//!
//! Runs a monitoring session for one profile with keyboard triggers.

use std::sync::Arc;
use std::time::Duration;

use crate::backup::BackupOrchestrator;
use crate::config::paths::GameSavePaths;
use crate::config::settings::Settings;
use crate::display::ConsoleSink;
use crate::error::GameSaveResult;
use crate::services::ProfileService;
use crate::session::{KeyboardEvents, MonitorSession, TerminationSignal};
use crate::storage::Storage;

/// Handle the watch command
pub fn handle_watch_command(
    storage: &Storage,
    paths: &GameSavePaths,
    settings: &Settings,
    profile_name: &str,
    termination: &TerminationSignal,
) -> GameSaveResult<()> {
    let profile = ProfileService::new(storage, settings).require(profile_name)?;

    let orchestrator = Arc::new(BackupOrchestrator::from_settings(paths, settings));
    let session = MonitorSession::new(
        orchestrator,
        Duration::from_secs(settings.scheduler_tick_secs),
        Arc::new(ConsoleSink),
    )
    .with_termination(termination.clone());

    let summary = {
        let mut events = KeyboardEvents::new(termination.clone())?;
        session.run(&profile, &mut events)?
    };

    println!(
        "Session ended: {} manual backup(s), {} restore(s).",
        summary.manual_backups, summary.restores
    );
    Ok(())
}
