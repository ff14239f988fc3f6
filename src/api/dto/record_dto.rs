//! DTOs for commit records, activity, and schedules.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{ActivityEntry, CommitRecord};

/// One stored commit record.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommitRecordDto {
    /// Record identifier.
    pub id: Uuid,
    /// Commit message.
    pub title: String,
    /// Branch at commit time.
    pub branch: String,
    /// Commit hash.
    pub commit_hash: String,
    /// Number of files in the commit.
    pub files_changed: usize,
    /// Paths in the commit.
    pub committed_files: Vec<String>,
    /// Database snapshot id, absent for degraded backups.
    pub db_snapshot: Option<String>,
    /// All attached metadata.
    pub metadata: BTreeMap<String, String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<CommitRecord> for CommitRecordDto {
    fn from(record: CommitRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            db_snapshot: record.db_snapshot().map(|s| s.as_str().to_string()),
            title: record.title,
            branch: record.branch,
            commit_hash: record.commit_hash.as_str().to_string(),
            files_changed: record.files_changed,
            committed_files: record.committed_files,
            metadata: record.metadata,
            created_at: record.created_at,
        }
    }
}

/// Response body for record listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecordListResponse {
    /// Records, newest first.
    pub data: Vec<CommitRecordDto>,
    /// Number of records returned.
    pub count: usize,
}

impl From<Vec<CommitRecord>> for RecordListResponse {
    fn from(records: Vec<CommitRecord>) -> Self {
        let data: Vec<CommitRecordDto> = records.into_iter().map(Into::into).collect();
        Self {
            count: data.len(),
            data,
        }
    }
}

/// Response body for `GET /activity`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityListResponse {
    /// Entries, newest first.
    pub data: Vec<ActivityEntry>,
    /// Number of entries returned.
    pub count: usize,
}

/// One cadence of the schedule table.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleDto {
    /// Cadence name as stored in `automatic-backups`.
    pub name: String,
    /// Period in seconds.
    pub interval_secs: u64,
    /// Operator-facing label.
    pub display: String,
}
