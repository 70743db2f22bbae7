use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gamesave::cli::{
    handle_backup_command, handle_config_command, handle_profile_command, handle_watch_command,
};
use gamesave::config::{paths::GameSavePaths, settings::Settings};
use gamesave::session::TerminationSignal;
use gamesave::storage::Storage;

#[derive(Parser)]
#[command(
    name = "gamesave",
    author = "Kaylee Beyene",
    version,
    about = "Timestamped game save backups with retention limits",
    long_about = "gamesave copies a game's save directory into timestamped archives, \
                  automatically on a timer and on demand, keeps the newest archives \
                  per class within configurable limits, optionally mirrors them into \
                  a synced folder, and restores any archive over the live save."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Game profile management commands
    #[command(subcommand)]
    Profile(gamesave::cli::ProfileCommands),

    /// Backup, prune and restore commands
    #[command(subcommand)]
    Backup(gamesave::cli::BackupCommands),

    /// Show or change configuration
    #[command(subcommand)]
    Config(gamesave::cli::ConfigCommands),

    /// Monitor a profile: automatic backups plus keyboard triggers
    Watch {
        /// Profile name
        profile: String,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gamesave=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    // Termination signals only raise a flag, so running work finishes first
    let termination = TerminationSignal::install()?;

    // Initialize paths and settings
    let paths = GameSavePaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Profile(cmd)) => {
            handle_profile_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Backup(cmd)) => {
            handle_backup_command(&storage, &paths, &settings, cmd)?;
        }
        Some(Commands::Config(cmd)) => {
            handle_config_command(&paths, &mut settings, cmd)?;
        }
        Some(Commands::Watch { profile }) => {
            handle_watch_command(&storage, &paths, &settings, &profile, &termination)?;
        }
        None => {
            println!("gamesave - game save backups with retention limits");
            println!();
            println!("Run 'gamesave --help' for usage information.");
            println!("Run 'gamesave profile add <NAME> <SAVE_DIR>' to get started.");
        }
    }

    Ok(())
}
