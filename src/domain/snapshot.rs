//! The set of changed paths captured at the start of a backup cycle.

use std::collections::BTreeSet;

/// Changed-file paths captured exactly once per backup cycle, before
/// staging.
///
/// The same snapshot is handed to the stage step and copied into the
/// commit record, so the staged files and the recorded files are the same
/// set by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingTreeSnapshot {
    files: BTreeSet<String>,
}

impl WorkingTreeSnapshot {
    /// Builds a snapshot from the paths reported by a status call.
    /// Duplicate and blank entries are dropped.
    #[must_use]
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let files = paths
            .into_iter()
            .map(Into::into)
            .filter(|p| !p.trim().is_empty())
            .collect();
        Self { files }
    }

    /// Number of changed files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` when nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns the paths in sorted order.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.files.iter().cloned().collect()
    }
}
