//! Database backup collaborator.
//!
//! [`DatabaseBackup`] produces a snapshot of the site database and
//! returns an identifier that can be traced back to a commit.
//! [`PgDumpBackup`] is the PostgreSQL adapter.

pub mod pg_dump;

use std::fmt;

use async_trait::async_trait;

use crate::domain::SnapshotId;
use crate::error::AutopilotError;

pub use pg_dump::PgDumpBackup;

/// Creates database snapshots.
#[async_trait]
pub trait DatabaseBackup: Send + Sync + fmt::Debug {
    /// Dumps the database and returns the snapshot identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::Database`] if the dump fails, or a
    /// version-control error if the dump cannot be committed.
    async fn backup(&self) -> Result<SnapshotId, AutopilotError>;
}
