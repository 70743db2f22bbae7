//! Configuration CLI commands

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::paths::{mirror_location_root, GameSavePaths};
use crate::config::settings::{RetentionLimits, Settings};
use crate::error::{GameSaveError, GameSaveResult};

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show paths and settings
    Show,

    /// Change retention limits (0 keeps every archive of that class)
    SetLimits {
        /// Local auto-save limit
        #[arg(long)]
        local_auto: Option<u32>,
        /// Local manual-save limit
        #[arg(long)]
        local_manual: Option<u32>,
        /// Mirror auto-save limit
        #[arg(long)]
        mirror_auto: Option<u32>,
        /// Mirror manual-save limit
        #[arg(long)]
        mirror_manual: Option<u32>,
    },

    /// Set the folder archives are mirrored into
    SetMirror {
        /// Folder watched by your sync agent
        path: PathBuf,
    },

    /// Turn mirroring off for every profile
    ClearMirror,
}

/// Handle a config command
pub fn handle_config_command(
    paths: &GameSavePaths,
    settings: &mut Settings,
    cmd: ConfigCommands,
) -> GameSaveResult<()> {
    match cmd {
        ConfigCommands::Show => {
            println!("gamesave Configuration");
            println!("======================");
            println!("Data directory:   {}", paths.base_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!("Profiles file:    {}", paths.profiles_file().display());
            println!("Local backups:    {}", paths.local_backup_root().display());
            match settings.mirror_path() {
                Some(path) => println!("Mirror backups:   {}", mirror_location_root(path).display()),
                None => println!("Mirror backups:   (not configured)"),
            }
            println!();
            println!("Retention (0 = unlimited):");
            print_limits("Local ", &settings.retention.local);
            print_limits("Mirror", &settings.retention.mirror);
            println!();
            println!("Scheduler tick:   {}s", settings.scheduler_tick_secs);
        }

        ConfigCommands::SetLimits {
            local_auto,
            local_manual,
            mirror_auto,
            mirror_manual,
        } => {
            if local_auto.is_none()
                && local_manual.is_none()
                && mirror_auto.is_none()
                && mirror_manual.is_none()
            {
                println!("Nothing to change.");
                return Ok(());
            }

            let retention = &mut settings.retention;
            let updates = [
                (local_auto, &mut retention.local.auto_limit),
                (local_manual, &mut retention.local.manual_limit),
                (mirror_auto, &mut retention.mirror.auto_limit),
                (mirror_manual, &mut retention.mirror.manual_limit),
            ];
            for (value, slot) in updates {
                if let Some(value) = value {
                    *slot = value;
                }
            }

            settings.save(paths)?;
            println!("Retention limits updated.");
            print_limits("Local ", &settings.retention.local);
            print_limits("Mirror", &settings.retention.mirror);
        }

        ConfigCommands::SetMirror { path } => {
            if !path.is_dir() {
                return Err(GameSaveError::Validation(format!(
                    "Mirror path is not a directory: {}",
                    path.display()
                )));
            }

            println!(
                "Archives will be mirrored into {}",
                mirror_location_root(&path).display()
            );
            settings.mirror_path = Some(path);
            settings.save(paths)?;
        }

        ConfigCommands::ClearMirror => {
            settings.mirror_path = None;
            settings.save(paths)?;
            println!("Mirroring disabled.");
        }
    }

    Ok(())
}

fn print_limits(label: &str, limits: &RetentionLimits) {
    println!(
        "  {}  auto: {:<4} manual: {}",
        label, limits.auto_limit, limits.manual_limit
    );
}
