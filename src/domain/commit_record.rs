//! Durable record of an automatic backup commit.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::snapshot::WorkingTreeSnapshot;
use super::{CommitId, RecordId, SnapshotId};

/// Metadata key under which the database snapshot id is attached.
pub const DB_SNAPSHOT_KEY: &str = "db_hash";

/// Fields supplied when a commit record is first created.
///
/// Built from the same [`WorkingTreeSnapshot`] that was staged, which is
/// what keeps `files_changed` and `committed_files` equal to the commit's
/// contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommitRecord {
    /// Commit message, e.g. `"Weekly backup - March 4, 2026"`.
    pub title: String,
    /// Branch checked out when the commit was made.
    pub branch: String,
    /// Hash of the commit the record describes.
    pub commit_hash: CommitId,
    /// Paths staged into the commit.
    pub committed_files: Vec<String>,
}

impl NewCommitRecord {
    /// Builds the record fields for a commit of `snapshot`.
    #[must_use]
    pub fn from_snapshot(
        title: String,
        branch: String,
        commit_hash: CommitId,
        snapshot: &WorkingTreeSnapshot,
    ) -> Self {
        Self {
            title,
            branch,
            commit_hash,
            committed_files: snapshot.paths(),
        }
    }

    /// Number of files in the commit.
    #[must_use]
    pub fn files_changed(&self) -> usize {
        self.committed_files.len()
    }
}

/// A stored commit record.
///
/// The record is written in two steps: the commit fields first, then the
/// database snapshot id as metadata once the dump succeeded. A record
/// without [`DB_SNAPSHOT_KEY`] is a degraded backup: code is safe in
/// version control but the matching database snapshot is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    /// Record identifier.
    pub id: RecordId,
    /// Commit message.
    pub title: String,
    /// Branch at commit time.
    pub branch: String,
    /// Commit hash.
    pub commit_hash: CommitId,
    /// Number of files in the commit.
    pub files_changed: usize,
    /// Paths in the commit.
    pub committed_files: Vec<String>,
    /// Additional metadata attached after creation.
    pub metadata: BTreeMap<String, String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl CommitRecord {
    /// Materializes a new record from its creation fields.
    #[must_use]
    pub fn new(id: RecordId, fields: NewCommitRecord, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            files_changed: fields.files_changed(),
            title: fields.title,
            branch: fields.branch,
            commit_hash: fields.commit_hash,
            committed_files: fields.committed_files,
            metadata: BTreeMap::new(),
            created_at,
        }
    }

    /// Returns the attached database snapshot id, if any.
    #[must_use]
    pub fn db_snapshot(&self) -> Option<SnapshotId> {
        self.metadata.get(DB_SNAPSHOT_KEY).map(CommitId::new)
    }

    /// Returns `true` when the database step never completed.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.metadata.contains_key(DB_SNAPSHOT_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> NewCommitRecord {
        let snapshot = WorkingTreeSnapshot::from_paths(["a.php", "b.php"]);
        NewCommitRecord::from_snapshot(
            "Weekly backup - March 4, 2026".to_string(),
            "main".to_string(),
            CommitId::new("abc123"),
            &snapshot,
        )
    }

    #[test]
    fn record_counts_match_snapshot() {
        let record = CommitRecord::new(RecordId::new(), fields(), Utc::now());
        assert_eq!(record.files_changed, 2);
        assert_eq!(record.committed_files, vec!["a.php", "b.php"]);
    }

    #[test]
    fn record_is_degraded_until_snapshot_attached() {
        let mut record = CommitRecord::new(RecordId::new(), fields(), Utc::now());
        assert!(record.is_degraded());
        assert_eq!(record.db_snapshot(), None);

        record
            .metadata
            .insert(DB_SNAPSHOT_KEY.to_string(), "def456".to_string());
        assert!(!record.is_degraded());
        assert_eq!(record.db_snapshot(), Some(CommitId::new("def456")));
    }
}
