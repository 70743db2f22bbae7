//! gamesave - timestamped game save backups with retention limits
//!
//! This library provides the backup and retention engine behind the
//! `gamesave` command: full-copy archives of a save directory, taken on a
//! timer and on demand, pruned per location and per archive class, optionally
//! mirrored into a folder kept in sync by an external agent, and restorable
//! over the live save.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution and persisted settings
//! - `error`: Custom error types
//! - `models`: Game profiles and archive locations
//! - `storage`: JSON profile store
//! - `backup`: Archive naming, retention, capture, scheduling and restore
//! - `services`: Profile workflows
//! - `session`: Monitoring sessions and trigger sources
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use gamesave::backup::{ArchiveClass, BackupOrchestrator};
//! use gamesave::config::{paths::GameSavePaths, settings::Settings};
//!
//! let paths = GameSavePaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let orchestrator = BackupOrchestrator::from_settings(&paths, &settings);
//! let report = orchestrator.run_backup(&profile, ArchiveClass::Manual);
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;

pub use error::{GameSaveError, GameSaveResult};
