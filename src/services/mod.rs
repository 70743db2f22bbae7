//! Service layer for gamesave
//!
//! The service layer provides the profile workflows on top of the storage
//! layer, handling validation and keeping archive trees consistent with
//! profile records.

pub mod profile;

pub use profile::{ProfileDeletion, ProfileService, ProfileUpdate};
