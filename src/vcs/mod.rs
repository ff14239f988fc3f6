//! Version-control collaborator.
//!
//! The sequencers never talk to git directly; they drive a
//! [`VersionControl`] implementation injected at startup. [`GitCli`] is
//! the production adapter, tests use recording mocks.

pub mod git_cli;

use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use crate::domain::CommitId;
use crate::error::AutopilotError;

pub use git_cli::GitCli;

/// Result of a commit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new commit was created.
    Committed(CommitId),
    /// Nothing was staged, so no commit was made.
    NothingToCommit,
}

/// Summary of a completed pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullReport {
    /// HEAD after the pull.
    pub head: CommitId,
    /// Number of incoming commits the pull brought in.
    pub pulled: usize,
}

/// Operations the sequencers need from a version-control working tree.
#[async_trait]
pub trait VersionControl: Send + Sync + fmt::Debug {
    /// Path of the working tree, used as the cycle-lock key.
    fn repo_path(&self) -> &Path;

    /// Name of the remote pulled from (e.g. `origin`).
    fn remote_name(&self) -> &str;

    /// Lists paths with uncommitted changes, untracked files included.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::VersionControl`] if the status call fails.
    async fn status(&self) -> Result<Vec<String>, AutopilotError>;

    /// Stages exactly `paths`, including deletions.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::VersionControl`] if staging fails.
    async fn stage(&self, paths: &[String]) -> Result<(), AutopilotError>;

    /// Commits the index with `message`.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::VersionControl`] if the commit fails for
    /// any reason other than an empty index.
    async fn commit(&self, message: &str) -> Result<CommitOutcome, AutopilotError>;

    /// Returns the hash of HEAD.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::VersionControl`] if HEAD cannot be resolved.
    async fn current_commit(&self) -> Result<CommitId, AutopilotError>;

    /// Returns the checked-out branch name.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::VersionControl`] if the branch cannot be
    /// resolved.
    async fn branch_name(&self) -> Result<String, AutopilotError>;

    /// Discards uncommitted changes to tracked files (hard reset).
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::VersionControl`] if the reset fails.
    async fn reset(&self) -> Result<(), AutopilotError>;

    /// Retrieves remote refs without merging.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::VersionControl`] if the fetch fails.
    async fn fetch(&self) -> Result<(), AutopilotError>;

    /// Lists commits reachable from `to` but not from `from`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::VersionControl`] if either ref is unknown.
    async fn log_range(&self, from: &str, to: &str) -> Result<Vec<CommitId>, AutopilotError>;

    /// Pulls the current branch from the remote and checks that the
    /// `expected` commits (newest first) arrived.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::VersionControl`] if the pull fails or the
    /// newest expected commit is not reachable from HEAD afterwards.
    async fn pull(&self, expected: &[CommitId]) -> Result<PullReport, AutopilotError>;

    /// Reads the persisted setting `namespace.key`.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::VersionControl`] if the read fails for a
    /// reason other than the key being absent.
    async fn get_config(&self, namespace: &str, key: &str)
    -> Result<Option<String>, AutopilotError>;

    /// Persists `namespace.key = value`.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::VersionControl`] if the write fails.
    async fn set_config(&self, namespace: &str, key: &str, value: &str)
    -> Result<(), AutopilotError>;
}
