use crate::delta::{ChangeKind, DiffStat};

/// How a report entry is marked in output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Added,
    Changed,
    Deleted,
    Info,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Added => write!(f, "+"),
            EntryKind::Changed => write!(f, "~"),
            EntryKind::Deleted => write!(f, "-"),
            EntryKind::Info => write!(f, "•"),
        }
    }
}

impl From<ChangeKind> for EntryKind {
    fn from(kind: ChangeKind) -> Self {
        match kind {
            ChangeKind::Added => EntryKind::Added,
            ChangeKind::Changed => EntryKind::Changed,
            ChangeKind::Deleted => EntryKind::Deleted,
        }
    }
}

/// A single line of a report section.
#[derive(Debug, Clone)]
pub struct Entry {
    pub kind: EntryKind,
    /// Main text (unit name, def path, file name, person, ...)
    pub text: String,
    /// Secondary text shown after the main text
    pub detail: Option<String>,
}

impl Entry {
    pub fn info(text: impl Into<String>) -> Self {
        Entry {
            kind: EntryKind::Info,
            text: text.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// A titled group of entries, optionally with an aggregate diffstat.
#[derive(Debug, Clone)]
pub struct Section {
    pub heading: String,
    pub stat: Option<DiffStat>,
    pub entries: Vec<Entry>,
}

/// Complete report for one CLI invocation.
#[derive(Debug)]
pub struct Report {
    pub title: String,
    pub subtitle: String,
    pub sections: Vec<Section>,
}
