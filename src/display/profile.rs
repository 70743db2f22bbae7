//! Profile display formatting
//!
//! Formats profiles for terminal output in table and detail views.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::GameProfile;

use super::archive::format_interval;

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Save Path")]
    save_path: String,
    #[tabled(rename = "Interval")]
    interval: String,
    #[tabled(rename = "Mirror")]
    mirror: &'static str,
}

impl From<&GameProfile> for ProfileRow {
    fn from(profile: &GameProfile) -> Self {
        Self {
            name: profile.name.clone(),
            save_path: profile.save_path.display().to_string(),
            interval: format_interval(profile.auto_save_interval_secs),
            mirror: if profile.mirror_enabled { "on" } else { "off" },
        }
    }
}

/// Format a list of profiles as a table
pub fn format_profile_list(profiles: &[GameProfile]) -> String {
    if profiles.is_empty() {
        return "No profiles found.".to_string();
    }

    let rows: Vec<ProfileRow> = profiles.iter().map(ProfileRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::psql());

    format!("{}\n\nTotal: {} profile(s)", table, profiles.len())
}

/// Format one profile with every field
pub fn format_profile_details(profile: &GameProfile, mirror_available: bool) -> String {
    let mirror = match (profile.mirror_enabled, mirror_available) {
        (true, true) => "enabled",
        (true, false) => "enabled (no mirror path configured)",
        (false, _) => "disabled",
    };

    let mut output = String::new();
    output.push_str(&format!("Profile: {}\n", profile.name));
    output.push_str(&format!("  Save path: {}\n", profile.save_path.display()));
    if !profile.save_path.is_dir() {
        output.push_str("             (directory does not exist)\n");
    }
    output.push_str(&format!(
        "  Auto-save: every {}\n",
        format_interval(profile.auto_save_interval_secs)
    ));
    output.push_str(&format!("  Mirror:    {}\n", mirror));
    output.push_str(&format!(
        "  Created:   {}\n",
        profile.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!(
        "  Updated:   {}",
        profile.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output
}
