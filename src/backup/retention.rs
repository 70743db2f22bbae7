//! Retention policy
//!
//! Decides which archives exceed a class limit at one location. The policy is
//! pure: it never touches the filesystem, and Auto and Manual archives are
//! counted separately so a surplus in one class never costs the other.

use crate::config::settings::RetentionLimits;

use super::naming::{ArchiveClass, ArchiveIdentity};

/// Select the archives to delete from an oldest-first sequence of one class.
///
/// Returns the oldest `count - limit` entries, or nothing when `limit` is 0
/// (unlimited) or the sequence is already within the limit.
pub fn select_for_deletion(oldest_first: &[ArchiveIdentity], limit: u32) -> &[ArchiveIdentity] {
    let limit = limit as usize;
    if limit == 0 || oldest_first.len() <= limit {
        return &[];
    }
    &oldest_first[..oldest_first.len() - limit]
}

/// Deletions for one location, split by class
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPlan {
    /// Auto archives found at the location
    pub auto_found: usize,
    /// Manual archives found at the location
    pub manual_found: usize,
    /// Auto archives to delete, oldest first
    pub auto: Vec<ArchiveIdentity>,
    /// Manual archives to delete, oldest first
    pub manual: Vec<ArchiveIdentity>,
}

impl RetentionPlan {
    /// Build the plan for a location listing in any order
    pub fn build(archives: &[ArchiveIdentity], limits: &RetentionLimits) -> Self {
        Self::build_keeping(archives, limits, None)
    }

    /// Like [`build`](Self::build), but `keep` is never selected.
    ///
    /// `keep` still counts toward its class limit; the surplus is taken from
    /// the oldest of the remaining archives instead.
    pub fn build_keeping(
        archives: &[ArchiveIdentity],
        limits: &RetentionLimits,
        keep: Option<&ArchiveIdentity>,
    ) -> Self {
        let auto = sorted_of_class(archives, ArchiveClass::Auto);
        let manual = sorted_of_class(archives, ArchiveClass::Manual);

        Self {
            auto_found: auto.len(),
            manual_found: manual.len(),
            auto: select_excluding(&auto, limits.auto_limit, keep),
            manual: select_excluding(&manual, limits.manual_limit, keep),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.auto.is_empty() && self.manual.is_empty()
    }

    pub fn total(&self) -> usize {
        self.auto.len() + self.manual.len()
    }
}

fn select_excluding(
    oldest_first: &[ArchiveIdentity],
    limit: u32,
    keep: Option<&ArchiveIdentity>,
) -> Vec<ArchiveIdentity> {
    let surplus = select_for_deletion(oldest_first, limit).len();
    oldest_first
        .iter()
        .filter(|a| Some(*a) != keep)
        .take(surplus)
        .cloned()
        .collect()
}

fn sorted_of_class(archives: &[ArchiveIdentity], class: ArchiveClass) -> Vec<ArchiveIdentity> {
    let mut of_class: Vec<ArchiveIdentity> = archives
        .iter()
        .filter(|a| a.class() == class)
        .cloned()
        .collect();
    of_class.sort();
    of_class
}
