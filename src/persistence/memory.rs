//! In-process [`RecordStore`].

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::RecordStore;
use crate::domain::{ActivityEntry, CommitRecord, NewCommitRecord, RecordId};
use crate::error::AutopilotError;

/// Activity entries kept by [`InMemoryRecordStore::new`].
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 1024;

/// Record store kept in memory; contents are lost on restart.
///
/// Activity entries form a ring: once `activity_capacity` entries are
/// held, the oldest is dropped for each new one.
#[derive(Debug)]
pub struct InMemoryRecordStore {
    records: RwLock<Vec<CommitRecord>>,
    activity: RwLock<VecDeque<ActivityEntry>>,
    activity_capacity: usize,
}

impl InMemoryRecordStore {
    /// Creates an empty store holding up to [`DEFAULT_ACTIVITY_CAPACITY`]
    /// activity entries.
    #[must_use]
    pub fn new() -> Self {
        Self::with_activity_capacity(DEFAULT_ACTIVITY_CAPACITY)
    }

    /// Creates an empty store holding up to `capacity` activity entries.
    #[must_use]
    pub fn with_activity_capacity(capacity: usize) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            activity: RwLock::new(VecDeque::new()),
            activity_capacity: capacity.max(1),
        }
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create_record(&self, fields: NewCommitRecord) -> Result<RecordId, AutopilotError> {
        let id = RecordId::new();
        self.records
            .write()
            .await
            .push(CommitRecord::new(id, fields, Utc::now()));
        Ok(id)
    }

    async fn attach_metadata(
        &self,
        id: RecordId,
        key: &str,
        value: &str,
    ) -> Result<(), AutopilotError> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AutopilotError::RecordNotFound(*id.as_uuid()))?;
        record.metadata.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_record(&self, id: RecordId) -> Result<Option<CommitRecord>, AutopilotError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn list_records(&self, limit: usize) -> Result<Vec<CommitRecord>, AutopilotError> {
        let records = self.records.read().await;
        Ok(records.iter().rev().take(limit).cloned().collect())
    }

    async fn list_degraded(&self) -> Result<Vec<CommitRecord>, AutopilotError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .filter(|r| r.is_degraded())
            .cloned()
            .collect())
    }

    async fn append_activity(&self, entry: &ActivityEntry) -> Result<(), AutopilotError> {
        let mut activity = self.activity.write().await;
        while activity.len() >= self.activity_capacity {
            activity.pop_front();
        }
        activity.push_back(entry.clone());
        Ok(())
    }

    async fn list_activity(&self, limit: usize) -> Result<Vec<ActivityEntry>, AutopilotError> {
        let activity = self.activity.read().await;
        Ok(activity.iter().rev().take(limit).cloned().collect())
    }
}
