//! Persistence layer: commit records and the activity log.
//!
//! Provides the [`RecordStore`] trait for durable storage of commit
//! records, their metadata, and activity log entries. The production
//! implementation uses `sqlx::PgPool`; [`InMemoryRecordStore`] backs tests
//! and deployments that run with persistence disabled.

pub mod activity_writer;
pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;

use crate::domain::{ActivityEntry, CommitRecord, NewCommitRecord, RecordId};
use crate::error::AutopilotError;

pub use activity_writer::spawn_activity_writer;
pub use memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;

/// Durable store for commit records and activity entries.
#[async_trait]
pub trait RecordStore: Send + Sync + fmt::Debug {
    /// Creates a commit record and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::Persistence`] on storage failure.
    async fn create_record(&self, fields: NewCommitRecord) -> Result<RecordId, AutopilotError>;

    /// Attaches `key = value` to an existing record, replacing any
    /// previous value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::RecordNotFound`] for an unknown record or
    /// [`AutopilotError::Persistence`] on storage failure.
    async fn attach_metadata(
        &self,
        id: RecordId,
        key: &str,
        value: &str,
    ) -> Result<(), AutopilotError>;

    /// Loads a record with its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::Persistence`] on storage failure.
    async fn get_record(&self, id: RecordId) -> Result<Option<CommitRecord>, AutopilotError>;

    /// Lists the most recent records, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::Persistence`] on storage failure.
    async fn list_records(&self, limit: usize) -> Result<Vec<CommitRecord>, AutopilotError>;

    /// Lists records that never received a database snapshot id, newest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::Persistence`] on storage failure.
    async fn list_degraded(&self) -> Result<Vec<CommitRecord>, AutopilotError>;

    /// Appends an activity log entry.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::Persistence`] on storage failure.
    async fn append_activity(&self, entry: &ActivityEntry) -> Result<(), AutopilotError>;

    /// Lists the most recent activity entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::Persistence`] on storage failure.
    async fn list_activity(&self, limit: usize) -> Result<Vec<ActivityEntry>, AutopilotError>;
}
