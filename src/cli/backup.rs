//! Backup CLI commands
//!
//! Implements CLI commands for creating, listing, pruning and restoring archives.

use clap::Subcommand;

use crate::backup::{
    ArchiveClass, ArchiveIdentity, BackupOrchestrator, RestoreSelector, RetentionPlan,
};
use crate::config::paths::GameSavePaths;
use crate::config::settings::Settings;
use crate::display::{format_archive_list, format_report, format_size};
use crate::error::{GameSaveError, GameSaveResult};
use crate::models::{GameProfile, Location};
use crate::services::ProfileService;
use crate::storage::Storage;

/// Archive name keyword for the newest manual archive
const LATEST_MANUAL: &str = "latest-manual";

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Back up a profile now
    Create {
        /// Profile name
        profile: String,
        /// Count the archive against the auto-save limit
        #[arg(long)]
        auto: bool,
    },

    /// List a profile's archives, newest first
    List {
        /// List the mirror location instead of the local one
        #[arg(long)]
        mirror: bool,
        /// Profile name
        profile: String,
    },

    /// Delete archives beyond the retention limits
    Prune {
        /// Profile name
        profile: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Restore an archive over the live save directory
    Restore {
        /// Profile name
        profile: String,
        /// Archive name, list number, 'latest' or 'latest-manual'
        archive: String,
        /// Restore from the mirror location
        #[arg(long)]
        mirror: bool,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command
pub fn handle_backup_command(
    storage: &Storage,
    paths: &GameSavePaths,
    settings: &Settings,
    cmd: BackupCommands,
) -> GameSaveResult<()> {
    let service = ProfileService::new(storage, settings);
    let orchestrator = BackupOrchestrator::from_settings(paths, settings);

    match cmd {
        BackupCommands::Create { profile, auto } => {
            let profile = service.require(&profile)?;
            let class = if auto {
                ArchiveClass::Auto
            } else {
                ArchiveClass::Manual
            };

            let report = orchestrator.run_backup(&profile, class);
            for line in format_report(&report) {
                println!("{}", line);
            }

            if !report.local_ok {
                return Err(GameSaveError::CaptureFailed(
                    report.local_error.unwrap_or_default(),
                ));
            }
        }

        BackupCommands::List { profile, mirror } => {
            let profile = service.require(&profile)?;
            let location = location_flag(mirror);
            if mirror && !settings.mirror_available() {
                println!("No mirror path is configured.");
                return Ok(());
            }

            let selector = RestoreSelector::for_orchestrator(&orchestrator);
            let archives = selector.list_for_display(location, &profile.name)?;
            println!(
                "{}",
                format_archive_list(location, &profile.name, &archives, chrono::Local::now())
            );
        }

        BackupCommands::Prune { profile, force } => {
            let profile = service.require(&profile)?;

            if !force {
                print_prune_plan(&orchestrator, &profile)?;
                return Ok(());
            }

            let passes = orchestrator.prune(&profile)?;
            let mut deleted = 0;
            let mut failed = 0;
            for pass in &passes {
                for line in pass.describe() {
                    println!("{}", line);
                }
                deleted += pass.attempted() - pass.failed();
                failed += pass.failed();
            }
            println!("Deleted {} archive(s).", deleted);

            if failed > 0 {
                return Err(GameSaveError::PurgeFailed {
                    failed,
                    attempted: deleted + failed,
                });
            }
        }

        BackupCommands::Restore {
            profile,
            archive,
            mirror,
            force,
        } => {
            let profile = service.require(&profile)?;
            let location = location_flag(mirror);
            let selector = RestoreSelector::for_orchestrator(&orchestrator);
            let identity = resolve_archive(&selector, &profile, location, &archive)?;

            println!("Archive:  {} ({})", identity, location);
            println!("Class:    {}", identity.class());
            println!("Target:   {}", profile.save_path.display());
            println!();

            if !force {
                println!("WARNING: This will replace ALL files in the save directory!");
                println!("To proceed, run again with --force flag:");
                println!(
                    "  gamesave backup restore \"{}\" {}{} --force",
                    profile.name,
                    archive,
                    if mirror { " --mirror" } else { "" }
                );
                return Ok(());
            }

            let outcome = if location == Location::Local && is_latest_manual(&archive) {
                selector.restore_latest_manual(&profile)?
            } else {
                selector.restore_chosen(&profile, location, &identity)?
            };
            println!("{}", outcome.summary_line());
            println!("Copied {}.", format_size(outcome.stats.bytes));
            if outcome.created_live_dir {
                println!("Note: the save directory did not exist and was created.");
            }
        }
    }

    Ok(())
}

fn location_flag(mirror: bool) -> Location {
    if mirror {
        Location::Mirror
    } else {
        Location::Local
    }
}

fn print_prune_plan(orchestrator: &BackupOrchestrator, profile: &GameProfile) -> GameSaveResult<()> {
    let limits = orchestrator.limits();
    let mut stores = vec![(orchestrator.local_store(), limits.local)];
    if let Some(mirror) = orchestrator.mirror_store() {
        stores.push((mirror, limits.mirror));
    }

    println!("Prune Summary");
    println!("=============");

    let mut total = 0;
    for (store, limits) in stores {
        let archives = store.list_archives(&profile.name)?;
        let plan = RetentionPlan::build(&archives, &limits);
        println!(
            "{}: {} auto (limit {}), {} manual (limit {}); {} to delete",
            store.location(),
            plan.auto_found,
            describe_limit(limits.auto_limit),
            plan.manual_found,
            describe_limit(limits.manual_limit),
            plan.total()
        );
        for identity in plan.auto.iter().chain(&plan.manual) {
            println!("  - {}", identity);
        }
        total += plan.total();
    }
    println!();

    if total == 0 {
        println!("No archives to prune.");
    } else {
        println!("To delete these archives, run again with --force flag:");
        println!("  gamesave backup prune \"{}\" --force", profile.name);
    }
    Ok(())
}

fn describe_limit(limit: u32) -> String {
    if limit == 0 {
        "unlimited".to_string()
    } else {
        limit.to_string()
    }
}

fn is_latest_manual(archive: &str) -> bool {
    archive.eq_ignore_ascii_case(LATEST_MANUAL)
}

/// Resolve a name, list number or keyword to an archive at `location`
fn resolve_archive(
    selector: &RestoreSelector,
    profile: &GameProfile,
    location: Location,
    archive: &str,
) -> GameSaveResult<ArchiveIdentity> {
    if location == Location::Mirror && selector.store(Location::Mirror).is_none() {
        return Err(GameSaveError::Config("no mirror path is configured".into()));
    }

    let archives = selector.list_for_display(location, &profile.name)?;

    if is_latest_manual(archive) {
        return archives
            .into_iter()
            .find(|a| a.class() == ArchiveClass::Manual)
            .ok_or_else(|| GameSaveError::NoManualArchive(profile.name.clone()));
    }

    if archives.is_empty() {
        return Err(GameSaveError::NoArchivesFound(format!(
            "{} at {}",
            profile.name, location
        )));
    }

    if archive.eq_ignore_ascii_case("latest") {
        return archives
            .into_iter()
            .next()
            .ok_or_else(|| GameSaveError::archive_not_found(archive));
    }

    if let Ok(n) = archive.parse::<usize>() {
        if let Some(identity) = n.checked_sub(1).and_then(|i| archives.get(i)) {
            return Ok(identity.clone());
        }
    }

    archives
        .into_iter()
        .find(|a| a.name() == archive)
        .ok_or_else(|| GameSaveError::archive_not_found(archive))
}
