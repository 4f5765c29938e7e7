use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::types::null_as_default;

/// Line counts summarizing a diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DiffStat {
    pub added: u32,
    pub changed: u32,
    pub deleted: u32,
}

impl DiffStat {
    pub const fn new(added: u32, changed: u32, deleted: u32) -> Self {
        Self {
            added,
            changed,
            deleted,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.added == 0 && self.changed == 0 && self.deleted == 0
    }
}

/// Field-wise sum, saturating at `u32::MAX`.
impl Add for DiffStat {
    type Output = DiffStat;

    fn add(self, other: DiffStat) -> DiffStat {
        DiffStat {
            added: self.added.saturating_add(other.added),
            changed: self.changed.saturating_add(other.changed),
            deleted: self.deleted.saturating_add(other.deleted),
        }
    }
}

impl AddAssign for DiffStat {
    fn add_assign(&mut self, other: DiffStat) {
        *self = *self + other;
    }
}

impl Sum for DiffStat {
    fn sum<I: Iterator<Item = DiffStat>>(iter: I) -> DiffStat {
        iter.fold(DiffStat::default(), Add::add)
    }
}

/// A contiguous region of changes within a file, as produced by the
/// server's diff component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Hunk {
    pub orig_start_line: u32,
    pub orig_lines: u32,
    pub orig_no_newline_at: u32,
    pub new_start_line: u32,
    pub new_lines: u32,
    /// Optional section heading (e.g. the enclosing function signature)
    pub section: String,
    /// Raw hunk lines, each prefixed with '+', '-' or ' '. Base64 on the wire.
    #[serde(with = "base64_body")]
    pub body: Vec<u8>,
}

impl Hunk {
    /// Count added, changed and deleted lines.
    ///
    /// A deletion immediately followed by an addition (or the reverse) is
    /// one changed line rather than one of each.
    pub fn stat(&self) -> DiffStat {
        let mut stat = DiffStat::default();
        let mut last: Option<u8> = None;

        for line in self.body.split(|&b| b == b'\n') {
            match line.first() {
                Some(b'-') if last == Some(b'+') => {
                    stat.added -= 1;
                    stat.changed += 1;
                    last = None;
                }
                Some(b'-') => {
                    stat.deleted += 1;
                    last = Some(b'-');
                }
                Some(b'+') if last == Some(b'-') => {
                    stat.deleted -= 1;
                    stat.changed += 1;
                    last = None;
                }
                Some(b'+') => {
                    stat.added += 1;
                    last = Some(b'+');
                }
                _ => last = None,
            }
        }
        stat
    }
}

/// The diff of a single file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FileDiff {
    pub orig_name: String,
    pub orig_time: Option<String>,
    pub new_name: String,
    pub new_time: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub extended: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    pub fn stat(&self) -> DiffStat {
        self.hunks.iter().map(Hunk::stat).sum()
    }

    /// Path of the file, taken from the new side unless the file was deleted.
    pub fn name(&self) -> &str {
        let name = if self.new_name.is_empty() || self.new_name == "/dev/null" {
            &self.orig_name
        } else {
            &self.new_name
        };
        name.strip_prefix("a/")
            .or_else(|| name.strip_prefix("b/"))
            .unwrap_or(name)
    }

    pub fn is_new(&self) -> bool {
        self.orig_name == "/dev/null"
    }

    pub fn is_deleted(&self) -> bool {
        self.new_name == "/dev/null"
    }
}

/// Files added/changed/deleted in a delta.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeltaFiles {
    #[serde(deserialize_with = "null_as_default")]
    pub file_diffs: Vec<FileDiff>,
}

impl DeltaFiles {
    /// Sum of all of the files' diffstats.
    pub fn diff_stat(&self) -> DiffStat {
        self.file_diffs.iter().map(FileDiff::stat).sum()
    }
}

mod base64_body {
    use super::*;

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => STANDARD
                .decode(encoded)
                .map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}
