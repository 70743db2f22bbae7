//! Archive directory naming
//!
//! Every archive is a directory named
//! `<epoch-seconds>-[<YYYY-MM-DD_HH-MM-SS>]-<A|M>`. The epoch prefix makes the
//! name sortable without reading filesystem metadata, the bracketed stamp is
//! local wall-clock time for humans, and the suffix is the archive class.

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// strftime format of the human-readable stamp
pub const STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

const STAMP_LEN: usize = 19;

/// Which retention limit an archive counts against
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArchiveClass {
    /// Created by the scheduler
    Auto,
    /// Created on user request
    Manual,
}

impl ArchiveClass {
    /// Single-letter directory suffix
    pub fn letter(self) -> char {
        match self {
            Self::Auto => 'A',
            Self::Manual => 'M',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'A' => Some(Self::Auto),
            'M' => Some(Self::Manual),
            _ => None,
        }
    }
}

impl fmt::Display for ArchiveClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "Auto"),
            Self::Manual => write!(f, "Manual"),
        }
    }
}

/// Identity of one archive: when it was taken and its class
///
/// Ordering is chronological (epoch seconds first), which is the order the
/// retention policy relies on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchiveIdentity {
    epoch_secs: i64,
    class: ArchiveClass,
    stamp: String,
}

impl ArchiveIdentity {
    /// Identity for an archive taken at `instant`
    pub fn new(instant: DateTime<Local>, class: ArchiveClass) -> Self {
        Self {
            epoch_secs: instant.timestamp(),
            class,
            stamp: instant.format(STAMP_FORMAT).to_string(),
        }
    }

    /// Identity for an archive taken at a Unix timestamp
    pub fn from_epoch(epoch_secs: i64, class: ArchiveClass) -> Option<Self> {
        Local
            .timestamp_opt(epoch_secs, 0)
            .single()
            .map(|instant| Self::new(instant, class))
    }

    /// Decode a directory name. Returns `None` for anything that is not an archive.
    pub fn parse(name: &str) -> Option<Self> {
        let class = class_of(name)?;
        let body = &name[..name.len() - 2];

        let (epoch, rest) = body.split_once("-[")?;
        if epoch.is_empty() || !epoch.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let epoch_secs: i64 = epoch.parse().ok()?;

        let stamp = rest.strip_suffix(']')?;
        if stamp.len() != STAMP_LEN || NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).is_err()
        {
            return None;
        }

        Some(Self {
            epoch_secs,
            class,
            stamp: stamp.to_string(),
        })
    }

    /// Directory name for this archive
    pub fn name(&self) -> String {
        format!("{}-[{}]-{}", self.epoch_secs, self.stamp, self.class.letter())
    }

    pub fn epoch_secs(&self) -> i64 {
        self.epoch_secs
    }

    pub fn class(&self) -> ArchiveClass {
        self.class
    }

    /// Local wall-clock stamp as written in the name
    pub fn stamp(&self) -> &str {
        &self.stamp
    }

    /// Creation instant, from the epoch prefix
    pub fn created_at(&self) -> Option<DateTime<Local>> {
        Local.timestamp_opt(self.epoch_secs, 0).single()
    }

    /// The same class one second later, used to step past a name collision
    pub fn next_second(&self) -> Option<Self> {
        Self::from_epoch(self.epoch_secs.checked_add(1)?, self.class)
    }
}

impl fmt::Display for ArchiveIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Encode an instant and class into an archive directory name
pub fn encode(instant: DateTime<Local>, class: ArchiveClass) -> String {
    ArchiveIdentity::new(instant, class).name()
}

/// Class of a directory name by suffix alone; `None` means neither `-A` nor `-M`
pub fn class_of(name: &str) -> Option<ArchiveClass> {
    let (rest, letter) = name.rsplit_once('-')?;
    if rest.is_empty() || letter.len() != 1 {
        return None;
    }
    letter.chars().next().and_then(ArchiveClass::from_letter)
}

/// Whether a directory name is a complete archive name
pub fn is_well_formed(name: &str) -> bool {
    ArchiveIdentity::parse(name).is_some()
}
