//! Archive display formatting

use chrono::{DateTime, Local};

use crate::backup::ArchiveIdentity;
use crate::models::Location;

/// Format archives as a numbered list, in the order given
pub fn format_archive_list(
    location: Location,
    profile_name: &str,
    archives: &[ArchiveIdentity],
    now: DateTime<Local>,
) -> String {
    if archives.is_empty() {
        return format!("No {} archives found for {}.", location, profile_name);
    }

    let mut output = format!("{} archives for {}\n", location, profile_name);
    output.push_str(&format!("{:=<1$}\n", "", output.trim_end().len()));

    for (i, archive) in archives.iter().enumerate() {
        let age = archive
            .created_at()
            .map(|created| format!("{} ago", format_age(now.signed_duration_since(created))))
            .unwrap_or_default();
        output.push_str(&format!(
            "{:>3}. {}  [{}]  {}\n",
            i + 1,
            archive,
            archive.class(),
            age
        ));
    }

    output.push_str(&format!("\nTotal: {} archive(s)", archives.len()));
    output
}

/// Format an age in its largest whole unit
pub fn format_age(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    format!("{}mo", days / 30)
}

/// Format an auto-save interval, e.g. `10m` or `1m 30s`
pub fn format_interval(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    let parts: Vec<String> = [(h, "h"), (m, "m"), (s, "s")]
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect();

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

/// Format a byte count in human-readable form
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
