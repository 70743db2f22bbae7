//! Game profile model
//!
//! A profile names one live save directory and how often it is captured.
//! The profile name doubles as the per-profile directory segment at every
//! archive location, so it must be a portable directory name.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Auto-save interval used when none is given (10 minutes)
pub const DEFAULT_AUTO_SAVE_INTERVAL_SECS: u64 = 600;

/// Longest accepted auto-save interval (7 days)
pub const MAX_AUTO_SAVE_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const RESERVED_NAMES: &[&str] = &["CON", "PRN", "AUX", "NUL"];

/// A monitored game save directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameProfile {
    /// Unique profile name, also the archive directory segment
    pub name: String,

    /// Live save directory that gets captured
    pub save_path: PathBuf,

    /// Seconds between automatic backups
    #[serde(default = "default_interval")]
    pub auto_save_interval_secs: u64,

    /// Whether archives are also copied to the mirror location
    #[serde(default)]
    pub mirror_enabled: bool,

    /// When the profile was created
    pub created_at: DateTime<Utc>,

    /// When the profile was last modified
    pub updated_at: DateTime<Utc>,
}

fn default_interval() -> u64 {
    DEFAULT_AUTO_SAVE_INTERVAL_SECS
}

impl GameProfile {
    /// Create a new profile with the default interval and mirroring off
    pub fn new(name: impl Into<String>, save_path: impl Into<PathBuf>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            save_path: save_path.into(),
            auto_save_interval_secs: DEFAULT_AUTO_SAVE_INTERVAL_SECS,
            mirror_enabled: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_interval(mut self, secs: u64) -> Self {
        self.auto_save_interval_secs = secs;
        self
    }

    pub fn with_mirror(mut self, enabled: bool) -> Self {
        self.mirror_enabled = enabled;
        self
    }

    /// Mark the profile as modified now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Validate the profile
    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        validate_profile_name(&self.name)?;

        if self.save_path.as_os_str().is_empty() {
            return Err(ProfileValidationError::EmptySavePath);
        }

        if self.auto_save_interval_secs == 0 {
            return Err(ProfileValidationError::ZeroInterval);
        }

        if self.auto_save_interval_secs > MAX_AUTO_SAVE_INTERVAL_SECS {
            return Err(ProfileValidationError::IntervalTooLong(
                self.auto_save_interval_secs,
            ));
        }

        Ok(())
    }
}

impl fmt::Display for GameProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.save_path.display())
    }
}

/// Check that a name is usable as a directory segment on every platform
pub fn validate_profile_name(name: &str) -> Result<(), ProfileValidationError> {
    if name.is_empty() {
        return Err(ProfileValidationError::EmptyName);
    }

    if let Some(c) = name
        .chars()
        .find(|c| FORBIDDEN_CHARS.contains(c) || c.is_control())
    {
        return Err(ProfileValidationError::InvalidCharacter(c));
    }

    let upper = name.to_ascii_uppercase();
    let is_numbered_device = upper.len() == 4
        && (upper.starts_with("COM") || upper.starts_with("LPT"))
        && matches!(upper.as_bytes()[3], b'1'..=b'9');
    if RESERVED_NAMES.contains(&upper.as_str()) || is_numbered_device {
        return Err(ProfileValidationError::ReservedName(name.to_string()));
    }

    if name.ends_with(' ') || name.ends_with('.') {
        return Err(ProfileValidationError::TrailingSpaceOrDot);
    }

    Ok(())
}

/// Validation errors for profiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    EmptyName,
    InvalidCharacter(char),
    ReservedName(String),
    TrailingSpaceOrDot,
    EmptySavePath,
    ZeroInterval,
    IntervalTooLong(u64),
}

impl fmt::Display for ProfileValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Profile name cannot be empty"),
            Self::InvalidCharacter(c) => write!(
                f,
                "Profile name contains invalid character {:?} (avoid < > : \" / \\ | ? * and control characters)",
                c
            ),
            Self::ReservedName(name) => write!(f, "'{}' is a reserved device name", name),
            Self::TrailingSpaceOrDot => {
                write!(f, "Profile name cannot end with a space or a dot")
            }
            Self::EmptySavePath => write!(f, "Save path cannot be empty"),
            Self::ZeroInterval => write!(f, "Auto-save interval must be at least 1 second"),
            Self::IntervalTooLong(secs) => write!(
                f,
                "Auto-save interval of {} seconds exceeds the maximum of {} seconds",
                secs, MAX_AUTO_SAVE_INTERVAL_SECS
            ),
        }
    }
}

impl std::error::Error for ProfileValidationError {}
