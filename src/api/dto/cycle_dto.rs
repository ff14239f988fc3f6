//! DTOs for the cycle triggers: auto-pull and on-demand backup.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{BackupOutcome, SyncOutcome};

/// Query string of `POST /autopull`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AutopullParams {
    /// Remote token shared with the webhook sender.
    #[serde(default)]
    pub token: String,
}

/// Response body for a successful `POST /autopull`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AutopullResponse {
    /// `pulled` or `up_to_date`.
    pub status: String,
    /// Branch that was synchronized.
    pub branch: String,
    /// Commits brought in, newest first.
    pub incoming_commits: Vec<String>,
    /// Database checkpoint taken before the pull.
    pub checkpoint: Option<String>,
    /// HEAD after the cycle.
    pub head: String,
}

impl From<SyncOutcome> for AutopullResponse {
    fn from(outcome: SyncOutcome) -> Self {
        let status = if outcome.incoming_commits.is_empty() {
            "up_to_date"
        } else {
            "pulled"
        };
        Self {
            status: status.to_string(),
            branch: outcome.branch,
            incoming_commits: outcome
                .incoming_commits
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            checkpoint: outcome.checkpoint.map(|c| c.as_str().to_string()),
            head: outcome.head.as_str().to_string(),
        }
    }
}

/// Response body for `POST /backups`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BackupResponse {
    /// `skipped`, `nothing_to_commit`, `completed`, or `degraded`.
    pub status: String,
    /// Cadence class in effect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadence: Option<String>,
    /// Commit record created by the cycle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<Uuid>,
    /// Backup commit hash.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    /// Database snapshot of the cycle. For degraded backups it is set only
    /// when the dump exists but could not be attached to the record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_snapshot: Option<String>,
    /// Number of files committed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_changed: Option<usize>,
    /// Why the database step failed, for degraded backups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BackupResponse {
    fn bare(status: &str) -> Self {
        Self {
            status: status.to_string(),
            cadence: None,
            record_id: None,
            commit: None,
            db_snapshot: None,
            files_changed: None,
            reason: None,
        }
    }
}

impl From<BackupOutcome> for BackupResponse {
    fn from(outcome: BackupOutcome) -> Self {
        match outcome {
            BackupOutcome::Skipped => Self::bare("skipped"),
            BackupOutcome::NothingToCommit { cadence } => Self {
                cadence: Some(cadence.as_str().to_string()),
                ..Self::bare("nothing_to_commit")
            },
            BackupOutcome::Completed {
                cadence,
                record_id,
                commit,
                db_snapshot,
                files_changed,
            } => Self {
                cadence: Some(cadence.as_str().to_string()),
                record_id: Some(*record_id.as_uuid()),
                commit: Some(commit.as_str().to_string()),
                db_snapshot: Some(db_snapshot.as_str().to_string()),
                files_changed: Some(files_changed),
                ..Self::bare("completed")
            },
            BackupOutcome::Degraded {
                cadence,
                record_id,
                commit,
                files_changed,
                db_snapshot,
                reason,
            } => Self {
                cadence: Some(cadence.as_str().to_string()),
                record_id: Some(*record_id.as_uuid()),
                commit: Some(commit.as_str().to_string()),
                db_snapshot: db_snapshot.map(|s| s.as_str().to_string()),
                files_changed: Some(files_changed),
                reason: Some(reason),
                ..Self::bare("degraded")
            },
        }
    }
}
