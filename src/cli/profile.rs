//! Profile CLI commands
//!
//! Implements CLI commands for game profile management.

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_profile_details, format_profile_list};
use crate::error::GameSaveResult;
use crate::services::{ProfileService, ProfileUpdate};
use crate::storage::Storage;

/// Profile subcommands
#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Add a new game profile
    Add {
        /// Profile name (also the archive folder name)
        name: String,
        /// Live save directory to back up
        save_path: PathBuf,
        /// Seconds between automatic backups (default 600)
        #[arg(short, long)]
        interval: Option<u64>,
        /// Also copy archives to the mirror location
        #[arg(short, long)]
        mirror: bool,
    },

    /// List all profiles
    List,

    /// Show profile details
    Show {
        /// Profile name
        name: String,
    },

    /// Edit a profile
    Edit {
        /// Profile name
        name: String,
        /// New profile name (moves existing archives)
        #[arg(long)]
        rename: Option<String>,
        /// New save directory
        #[arg(long)]
        path: Option<PathBuf>,
        /// New auto-save interval in seconds
        #[arg(short, long)]
        interval: Option<u64>,
        /// Enable mirroring
        #[arg(long, conflicts_with = "no_mirror")]
        mirror: bool,
        /// Disable mirroring
        #[arg(long)]
        no_mirror: bool,
    },

    /// Remove a profile
    Remove {
        /// Profile name
        name: String,
        /// Also delete the profile's local archives
        #[arg(long)]
        purge_local: bool,
        /// Also delete the profile's mirror archives
        #[arg(long)]
        purge_mirror: bool,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a profile command
pub fn handle_profile_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ProfileCommands,
) -> GameSaveResult<()> {
    let service = ProfileService::new(storage, settings);

    match cmd {
        ProfileCommands::Add {
            name,
            save_path,
            interval,
            mirror,
        } => {
            let profile = service.create(&name, save_path, interval, mirror)?;
            println!("Created profile: {}", profile.name);
            if mirror && !profile.mirror_enabled {
                println!("Note: mirroring is off because no mirror path is configured.");
                println!("Set one with: gamesave config set-mirror <PATH>");
            }
            if !profile.save_path.is_dir() {
                println!(
                    "Warning: save directory {} does not exist yet.",
                    profile.save_path.display()
                );
            }
        }

        ProfileCommands::List => {
            let profiles = service.list()?;
            println!("{}", format_profile_list(&profiles));
        }

        ProfileCommands::Show { name } => {
            let profile = service.require(&name)?;
            println!(
                "{}",
                format_profile_details(&profile, settings.mirror_available())
            );
        }

        ProfileCommands::Edit {
            name,
            rename,
            path,
            interval,
            mirror,
            no_mirror,
        } => {
            let update = ProfileUpdate {
                name: rename,
                save_path: path,
                auto_save_interval_secs: interval,
                mirror_enabled: match (mirror, no_mirror) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
            };

            if update.is_empty() {
                println!("Nothing to change.");
                return Ok(());
            }

            let profile = service.update(&name, update)?;
            println!("Updated profile: {}", profile.name);
        }

        ProfileCommands::Remove {
            name,
            purge_local,
            purge_mirror,
            force,
        } => {
            let profile = service.require(&name)?;

            if !force {
                println!("This will remove profile '{}'.", profile.name);
                if purge_local {
                    println!("All local archives for this profile will be deleted.");
                }
                if purge_mirror {
                    println!("All mirror archives for this profile will be deleted.");
                }
                println!("To proceed, run again with --force flag:");
                println!("  gamesave profile remove \"{}\" --force", profile.name);
                return Ok(());
            }

            let deletion = service.delete(&name, purge_local, purge_mirror)?;
            println!("Removed profile: {}", deletion.profile.name);
            if deletion.local_removed {
                println!("Deleted local archives.");
            }
            if deletion.mirror_removed {
                println!("Deleted mirror archives.");
            }
        }
    }

    Ok(())
}
