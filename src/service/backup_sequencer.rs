//! Automatic backup: commit the working tree, record it, dump the
//! database.
//!
//! The cycle is linear. The version-control commit comes first because it
//! is cheap and nearly always succeeds; the slower, failure-prone database
//! dump comes second, so a failed dump still leaves a recoverable code
//! snapshot and a record flagged as degraded.

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use super::config_gate::ConfigGate;
use crate::database::DatabaseBackup;
use crate::domain::{
    ActivityCategory, ActivityLog, BackupOutcome, BackupPolicy, CadenceClass, CycleLocks,
    DB_SNAPSHOT_KEY, NewCommitRecord, RecordId, SnapshotId, WorkingTreeSnapshot,
    backup_commit_message,
};
use crate::error::AutopilotError;
use crate::persistence::RecordStore;
use crate::vcs::{CommitOutcome, VersionControl};

/// Runs automatic backup cycles.
///
/// Holds no state between cycles: every run re-reads the policy and
/// writes its results through the injected collaborators.
#[derive(Debug, Clone)]
pub struct BackupSequencer {
    vcs: Arc<dyn VersionControl>,
    db: Arc<dyn DatabaseBackup>,
    records: Arc<dyn RecordStore>,
    gate: ConfigGate,
    activity: ActivityLog,
    locks: Arc<CycleLocks>,
}

impl BackupSequencer {
    /// Creates a sequencer over the given collaborators.
    #[must_use]
    pub fn new(
        vcs: Arc<dyn VersionControl>,
        db: Arc<dyn DatabaseBackup>,
        records: Arc<dyn RecordStore>,
        gate: ConfigGate,
        activity: ActivityLog,
        locks: Arc<CycleLocks>,
    ) -> Self {
        Self {
            vcs,
            db,
            records,
            gate,
            activity,
            locks,
        }
    }

    /// Runs one automatic backup cycle dated today (local time).
    ///
    /// # Errors
    ///
    /// See [`BackupSequencer::run_automatic_backup_on`].
    pub async fn run_automatic_backup(&self) -> Result<BackupOutcome, AutopilotError> {
        self.run_automatic_backup_on(Local::now().date_naive()).await
    }

    /// Runs one automatic backup cycle, using `date` in the commit message.
    ///
    /// A failed database dump is not an error: the cycle returns
    /// [`BackupOutcome::Degraded`] and leaves the record without a
    /// snapshot id.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::CycleInProgress`] if another cycle holds
    /// the working tree, or the collaborator error if status, stage,
    /// commit, branch lookup, or record creation fails.
    pub async fn run_automatic_backup_on(
        &self,
        date: NaiveDate,
    ) -> Result<BackupOutcome, AutopilotError> {
        let BackupPolicy::Cadence(cadence) = self.gate.resolve_backup_policy().await else {
            return Ok(BackupOutcome::Skipped);
        };

        let _guard = self.locks.try_acquire(self.vcs.repo_path()).await?;

        let snapshot = WorkingTreeSnapshot::from_paths(self.vcs.status().await?);
        if snapshot.is_empty() {
            tracing::info!(cadence = %cadence, "working tree clean, nothing to back up");
            return Ok(BackupOutcome::NothingToCommit { cadence });
        }

        let message = backup_commit_message(&cadence, date);
        self.vcs.stage(&snapshot.paths()).await?;
        let commit = match self.vcs.commit(&message).await? {
            CommitOutcome::Committed(id) => id,
            CommitOutcome::NothingToCommit => {
                tracing::info!(cadence = %cadence, "no staged changes, nothing to back up");
                return Ok(BackupOutcome::NothingToCommit { cadence });
            }
        };

        let branch = self.vcs.branch_name().await?;
        let fields = NewCommitRecord::from_snapshot(message, branch, commit.clone(), &snapshot);
        let files_changed = fields.files_changed();
        let record_id = match self.records.create_record(fields).await {
            Ok(id) => id,
            Err(e) => {
                self.activity.log(
                    format!(
                        "Commit {} was created but its record could not be saved: {e}",
                        commit.short()
                    ),
                    ActivityCategory::Error,
                );
                return Err(e);
            }
        };
        tracing::info!(%record_id, commit = %commit.short(), files_changed, "backup committed");

        let (db_snapshot, err) = match self.attach_db_snapshot(record_id).await {
            SnapshotStep::Attached(db_snapshot) => {
                self.activity.log(
                    format!("The {cadence} backup was successful."),
                    ActivityCategory::Backup,
                );
                return Ok(BackupOutcome::Completed {
                    cadence,
                    record_id,
                    commit,
                    db_snapshot,
                    files_changed,
                });
            }
            SnapshotStep::Unattached(snapshot, err) => (Some(snapshot), err),
            SnapshotStep::DumpFailed(err) => (None, err),
        };

        self.activity.log(
            degraded_message(&cadence, commit.short(), db_snapshot.as_ref(), &err),
            ActivityCategory::Error,
        );
        Ok(BackupOutcome::Degraded {
            cadence,
            record_id,
            commit,
            files_changed,
            db_snapshot,
            reason: err.to_string(),
        })
    }

    async fn attach_db_snapshot(&self, record_id: RecordId) -> SnapshotStep {
        let snapshot = match self.db.backup().await {
            Ok(snapshot) => snapshot,
            Err(e) => return SnapshotStep::DumpFailed(e),
        };
        match self
            .records
            .attach_metadata(record_id, DB_SNAPSHOT_KEY, snapshot.as_str())
            .await
        {
            Ok(()) => SnapshotStep::Attached(snapshot),
            Err(e) => SnapshotStep::Unattached(snapshot, e),
        }
    }
}

/// How far the database half of a backup got.
enum SnapshotStep {
    Attached(SnapshotId),
    /// Dumped, but the record write failed.
    Unattached(SnapshotId, AutopilotError),
    DumpFailed(AutopilotError),
}

fn degraded_message(
    cadence: &CadenceClass,
    commit: &str,
    snapshot: Option<&SnapshotId>,
    err: &AutopilotError,
) -> String {
    match snapshot {
        Some(snapshot) => format!(
            "The {cadence} backup committed {commit} and dumped the database as {}, \
             but the snapshot could not be attached to its record: {err}",
            snapshot.short()
        ),
        None => format!(
            "The {cadence} backup committed {commit} but the database backup failed: {err}"
        ),
    }
}
