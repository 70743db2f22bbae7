//! Display formatting for terminal output
//!
//! Provides utilities for formatting profiles, archive listings and backup
//! reports for terminal display.

pub mod archive;
pub mod profile;
pub mod report;

pub use archive::{format_age, format_archive_list, format_interval, format_size};
pub use profile::{format_profile_details, format_profile_list};
pub use report::{emit, format_report, ConsoleSink};
