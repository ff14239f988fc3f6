//! Results of backup and sync cycles.

use serde::Serialize;

use super::{CadenceClass, CommitId, RecordId, SnapshotId};

/// How an automatic backup cycle ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BackupOutcome {
    /// Automatic backups are disabled; nothing was touched.
    Skipped,
    /// The working tree had no changes to commit.
    NothingToCommit {
        /// Cadence class of the cycle.
        cadence: CadenceClass,
    },
    /// Commit, record and database snapshot all succeeded.
    Completed {
        /// Cadence class of the cycle.
        cadence: CadenceClass,
        /// Record describing the commit.
        record_id: RecordId,
        /// Backup commit hash.
        commit: CommitId,
        /// Database snapshot attached to the record.
        db_snapshot: SnapshotId,
        /// Number of files committed.
        files_changed: usize,
    },
    /// The code commit succeeded but the database step did not.
    ///
    /// The record exists without a snapshot id and shows up in the
    /// record store's degraded listing.
    Degraded {
        /// Cadence class of the cycle.
        cadence: CadenceClass,
        /// Record describing the commit.
        record_id: RecordId,
        /// Backup commit hash.
        commit: CommitId,
        /// Number of files committed.
        files_changed: usize,
        /// Snapshot taken but not attached to the record, when the dump
        /// succeeded and only the metadata write failed.
        db_snapshot: Option<SnapshotId>,
        /// Why the database step failed.
        reason: String,
    },
}

impl BackupOutcome {
    /// Returns the record created by this cycle, if any.
    #[must_use]
    pub const fn record_id(&self) -> Option<RecordId> {
        match self {
            Self::Completed { record_id, .. } | Self::Degraded { record_id, .. } => {
                Some(*record_id)
            }
            Self::Skipped | Self::NothingToCommit { .. } => None,
        }
    }
}

/// Result of a successful auto-pull cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    /// Branch that was pulled.
    pub branch: String,
    /// Commits that were on the remote but not local before the pull,
    /// newest first.
    pub incoming_commits: Vec<CommitId>,
    /// Checkpoint persisted before the pull, when import-on-pull is on.
    pub checkpoint: Option<SnapshotId>,
    /// HEAD after the pull.
    pub head: CommitId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_record_creating_outcomes_expose_record() {
        assert_eq!(BackupOutcome::Skipped.record_id(), None);
        let id = RecordId::new();
        let degraded = BackupOutcome::Degraded {
            cadence: CadenceClass::new("daily"),
            record_id: id,
            commit: CommitId::new("abc"),
            files_changed: 1,
            db_snapshot: None,
            reason: "pg_dump missing".to_string(),
        };
        assert_eq!(degraded.record_id(), Some(id));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let value = serde_json::to_value(BackupOutcome::Skipped).ok();
        assert_eq!(value, Some(serde_json::json!({ "status": "skipped" })));
    }
}
