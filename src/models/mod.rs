//! Core data models for gamesave
//!
//! Profiles describe what gets backed up; locations describe where archives go.

pub mod location;
pub mod profile;

pub use location::Location;
pub use profile::{
    validate_profile_name, GameProfile, ProfileValidationError, DEFAULT_AUTO_SAVE_INTERVAL_SECS,
    MAX_AUTO_SAVE_INTERVAL_SECS,
};
