//! Per-call time budgets for collaborators.
//!
//! The sequencers never time out on their own; instead the collaborators
//! handed to them are wrapped in [`TimeoutVersionControl`] and
//! [`TimeoutDatabaseBackup`], which bound every call with
//! [`tokio::time::timeout`]. An expired call surfaces as
//! [`AutopilotError::Timeout`] and the child process is killed when its
//! future is dropped.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::database::DatabaseBackup;
use crate::domain::{CommitId, SnapshotId};
use crate::error::AutopilotError;
use crate::vcs::{CommitOutcome, PullReport, VersionControl};

/// Awaits `fut` for at most `budget`.
///
/// # Errors
///
/// Returns [`AutopilotError::Timeout`] naming `operation` when the budget
/// expires, otherwise whatever `fut` returns.
pub async fn within<T, F>(
    operation: &'static str,
    budget: Duration,
    fut: F,
) -> Result<T, AutopilotError>
where
    F: Future<Output = Result<T, AutopilotError>>,
{
    tokio::time::timeout(budget, fut)
        .await
        .map_err(|_| AutopilotError::Timeout {
            operation,
            secs: budget.as_secs(),
        })?
}

/// [`VersionControl`] decorator bounding every call.
#[derive(Debug)]
pub struct TimeoutVersionControl {
    inner: Arc<dyn VersionControl>,
    budget: Duration,
}

impl TimeoutVersionControl {
    /// Wraps `inner` with a per-call `budget`.
    #[must_use]
    pub fn new(inner: Arc<dyn VersionControl>, budget: Duration) -> Self {
        Self { inner, budget }
    }
}

#[async_trait]
impl VersionControl for TimeoutVersionControl {
    fn repo_path(&self) -> &Path {
        self.inner.repo_path()
    }

    fn remote_name(&self) -> &str {
        self.inner.remote_name()
    }

    async fn status(&self) -> Result<Vec<String>, AutopilotError> {
        within("status", self.budget, self.inner.status()).await
    }

    async fn stage(&self, paths: &[String]) -> Result<(), AutopilotError> {
        within("stage", self.budget, self.inner.stage(paths)).await
    }

    async fn commit(&self, message: &str) -> Result<CommitOutcome, AutopilotError> {
        within("commit", self.budget, self.inner.commit(message)).await
    }

    async fn current_commit(&self) -> Result<CommitId, AutopilotError> {
        within("current_commit", self.budget, self.inner.current_commit()).await
    }

    async fn branch_name(&self) -> Result<String, AutopilotError> {
        within("branch_name", self.budget, self.inner.branch_name()).await
    }

    async fn reset(&self) -> Result<(), AutopilotError> {
        within("reset", self.budget, self.inner.reset()).await
    }

    async fn fetch(&self) -> Result<(), AutopilotError> {
        within("fetch", self.budget, self.inner.fetch()).await
    }

    async fn log_range(&self, from: &str, to: &str) -> Result<Vec<CommitId>, AutopilotError> {
        within("log_range", self.budget, self.inner.log_range(from, to)).await
    }

    async fn pull(&self, expected: &[CommitId]) -> Result<PullReport, AutopilotError> {
        within("pull", self.budget, self.inner.pull(expected)).await
    }

    async fn get_config(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<String>, AutopilotError> {
        within("get_config", self.budget, self.inner.get_config(namespace, key)).await
    }

    async fn set_config(
        &self,
        namespace: &str,
        key: &str,
        value: &str,
    ) -> Result<(), AutopilotError> {
        within(
            "set_config",
            self.budget,
            self.inner.set_config(namespace, key, value),
        )
        .await
    }
}

/// [`DatabaseBackup`] decorator bounding every dump.
#[derive(Debug)]
pub struct TimeoutDatabaseBackup {
    inner: Arc<dyn DatabaseBackup>,
    budget: Duration,
}

impl TimeoutDatabaseBackup {
    /// Wraps `inner` with a per-call `budget`.
    #[must_use]
    pub fn new(inner: Arc<dyn DatabaseBackup>, budget: Duration) -> Self {
        Self { inner, budget }
    }
}

#[async_trait]
impl DatabaseBackup for TimeoutDatabaseBackup {
    async fn backup(&self) -> Result<SnapshotId, AutopilotError> {
        within("database backup", self.budget, self.inner.backup()).await
    }
}
