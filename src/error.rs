//! Custom error types for gamesave
//!
//! This module defines the error hierarchy for the backup engine using thiserror
//! for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for gamesave operations
#[derive(Error, Debug)]
pub enum GameSaveError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for profiles and settings
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Copying the live save directory into a new archive failed
    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    /// Some archives selected for deletion could not be removed
    #[error("Purge incomplete: {failed} of {attempted} archive(s) could not be deleted")]
    PurgeFailed { failed: usize, attempted: usize },

    /// A location holds no archives for the profile
    #[error("No archives found for {0}")]
    NoArchivesFound(String),

    /// No manual archive exists at the local location
    #[error("No manual (-M) archive found for {0}")]
    NoManualArchive(String),

    /// Clearing or repopulating the live save directory failed
    #[error("Restore failed: {0}")]
    RestoreFailed(String),

    /// The live save path is missing or not a directory
    #[error("Save directory unavailable: {}", .0.display())]
    SourceUnavailable(PathBuf),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Monitoring session errors
    #[error("Session error: {0}")]
    Session(String),
}

impl GameSaveError {
    /// Create a "not found" error for profiles
    pub fn profile_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Profile",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for archives
    pub fn archive_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Archive",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for GameSaveError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GameSaveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for gamesave operations
pub type GameSaveResult<T> = Result<T, GameSaveError>;
