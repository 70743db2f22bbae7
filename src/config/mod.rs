//! Configuration module for gamesave
//!
//! This module provides configuration management including:
//! - Path resolution for settings, profiles and local backups
//! - Retention limits and mirror path persistence

pub mod paths;
pub mod settings;

pub use paths::GameSavePaths;
pub use settings::{RetentionLimits, RetentionSettings, Settings};
