//! Backup and retention engine
//!
//! Provides timestamped full-copy archives of a save directory, retention
//! limits per location and class, scheduled backups, and restore.
//!
//! # Architecture
//!
//! - `naming`: archive directory names and their identity
//! - `retention`: which archives exceed a limit
//! - `store`: capture, list and purge at one location root
//! - `orchestrator`: one backup run across the local and mirror stores
//! - `scheduler`: cancelable background loop of Auto backups
//! - `restore`: listing for display and overwrite-restore
//!
//! # Layout
//!
//! ```text
//! <location root>/<profile>/<epoch>-[<YYYY-MM-DD_HH-MM-SS>]-<A|M>/
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use gamesave::backup::{ArchiveClass, BackupOrchestrator};
//! use gamesave::config::{GameSavePaths, Settings};
//!
//! let paths = GameSavePaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let orchestrator = BackupOrchestrator::from_settings(&paths, &settings);
//!
//! let report = orchestrator.run_backup(&profile, ArchiveClass::Manual);
//! println!("{}", report.summary_line());
//! ```

pub mod clock;
pub mod copy;
pub mod naming;
pub mod orchestrator;
pub mod restore;
pub mod retention;
pub mod scheduler;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use naming::{ArchiveClass, ArchiveIdentity};
pub use orchestrator::{BackupOrchestrator, BackupReport, ProfileLocks};
pub use restore::{RestoreOutcome, RestoreSelector};
pub use retention::RetentionPlan;
pub use scheduler::{AutoSaveScheduler, CancellationToken, ReportSink};
pub use store::{BackupStore, PurgeOutcome, RetentionPass};
