//! Recording collaborators for unit tests.
//!
//! [`MockVcs`] and [`MockDatabase`] append every call to a shared
//! [`CallLog`], so a test can assert on the exact cross-collaborator
//! order of a cycle.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::database::DatabaseBackup;
use crate::domain::{CommitId, SnapshotId};
use crate::error::AutopilotError;
use crate::vcs::{CommitOutcome, PullReport, VersionControl};

/// One recorded collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Status,
    Stage(Vec<String>),
    Commit(String),
    CurrentCommit,
    BranchName,
    Reset,
    Fetch,
    LogRange(String, String),
    Pull(Vec<CommitId>),
    GetConfig(String),
    SetConfig(String, String),
    DbBackup,
}

impl Call {
    /// Whether the call mutates the working tree or the database.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Stage(_)
                | Self::Commit(_)
                | Self::Reset
                | Self::Fetch
                | Self::Pull(_)
                | Self::SetConfig(..)
                | Self::DbBackup
        )
    }
}

/// Call history shared by the mocks of one test.
pub type CallLog = Arc<Mutex<Vec<Call>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory working tree with recorded calls.
#[derive(Debug)]
pub struct MockVcs {
    log: CallLog,
    repo: PathBuf,
    dirty: Mutex<Vec<String>>,
    staged: Mutex<BTreeSet<String>>,
    next_commits: Mutex<VecDeque<String>>,
    commit_count: Mutex<usize>,
    head: Mutex<String>,
    config: Mutex<HashMap<String, String>>,
    incoming: Vec<CommitId>,
    decline_commits: bool,
    fail_pull: bool,
    fail_status: bool,
}

impl MockVcs {
    pub fn new() -> Self {
        Self {
            log: CallLog::default(),
            repo: PathBuf::from("/srv/site"),
            dirty: Mutex::new(Vec::new()),
            staged: Mutex::new(BTreeSet::new()),
            next_commits: Mutex::new(VecDeque::new()),
            commit_count: Mutex::new(0),
            head: Mutex::new("base000".to_string()),
            config: Mutex::new(HashMap::new()),
            incoming: Vec::new(),
            decline_commits: false,
            fail_pull: false,
            fail_status: false,
        }
    }

    pub fn with_repo(mut self, repo: &Path) -> Self {
        self.repo = repo.to_path_buf();
        self
    }

    pub fn with_dirty(self, paths: &[&str]) -> Self {
        lock(&self.dirty).extend(paths.iter().map(|p| (*p).to_string()));
        self
    }

    pub fn with_next_commit(self, hash: &str) -> Self {
        lock(&self.next_commits).push_back(hash.to_string());
        self
    }

    pub fn with_config(self, namespace: &str, key: &str, value: &str) -> Self {
        lock(&self.config).insert(format!("{namespace}.{key}"), value.to_string());
        self
    }

    pub fn with_incoming(mut self, hashes: &[&str]) -> Self {
        self.incoming = hashes.iter().map(CommitId::new).collect();
        self
    }

    /// Makes every commit report an empty index.
    pub fn declining_commits(mut self) -> Self {
        self.decline_commits = true;
        self
    }

    pub fn failing_pull(mut self) -> Self {
        self.fail_pull = true;
        self
    }

    pub fn failing_status(mut self) -> Self {
        self.fail_status = true;
        self
    }

    pub fn call_log(&self) -> CallLog {
        Arc::clone(&self.log)
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.log).clone()
    }

    pub fn config_value(&self, name: &str) -> Option<String> {
        lock(&self.config).get(name).cloned()
    }

    fn record(&self, call: Call) {
        lock(&self.log).push(call);
    }
}

#[async_trait]
impl VersionControl for MockVcs {
    fn repo_path(&self) -> &Path {
        &self.repo
    }

    fn remote_name(&self) -> &str {
        "origin"
    }

    async fn status(&self) -> Result<Vec<String>, AutopilotError> {
        self.record(Call::Status);
        if self.fail_status {
            return Err(AutopilotError::VersionControl(
                "git status exited with 128: index.lock exists".to_string(),
            ));
        }
        Ok(lock(&self.dirty).clone())
    }

    async fn stage(&self, paths: &[String]) -> Result<(), AutopilotError> {
        self.record(Call::Stage(paths.to_vec()));
        lock(&self.dirty).retain(|p| !paths.contains(p));
        lock(&self.staged).extend(paths.iter().cloned());
        Ok(())
    }

    async fn commit(&self, message: &str) -> Result<CommitOutcome, AutopilotError> {
        self.record(Call::Commit(message.to_string()));
        let mut staged = lock(&self.staged);
        if self.decline_commits || staged.is_empty() {
            return Ok(CommitOutcome::NothingToCommit);
        }
        staged.clear();

        let mut count = lock(&self.commit_count);
        *count += 1;
        let hash = lock(&self.next_commits)
            .pop_front()
            .unwrap_or_else(|| format!("commit{count:03}"));
        *lock(&self.head) = hash.clone();
        Ok(CommitOutcome::Committed(CommitId::new(hash)))
    }

    async fn current_commit(&self) -> Result<CommitId, AutopilotError> {
        self.record(Call::CurrentCommit);
        Ok(CommitId::new(lock(&self.head).as_str()))
    }

    async fn branch_name(&self) -> Result<String, AutopilotError> {
        self.record(Call::BranchName);
        Ok("main".to_string())
    }

    async fn reset(&self) -> Result<(), AutopilotError> {
        self.record(Call::Reset);
        lock(&self.dirty).clear();
        Ok(())
    }

    async fn fetch(&self) -> Result<(), AutopilotError> {
        self.record(Call::Fetch);
        Ok(())
    }

    async fn log_range(&self, from: &str, to: &str) -> Result<Vec<CommitId>, AutopilotError> {
        self.record(Call::LogRange(from.to_string(), to.to_string()));
        Ok(self.incoming.clone())
    }

    async fn pull(&self, expected: &[CommitId]) -> Result<PullReport, AutopilotError> {
        self.record(Call::Pull(expected.to_vec()));
        if self.fail_pull {
            return Err(AutopilotError::VersionControl(
                "git pull exited with 1: merge conflict".to_string(),
            ));
        }
        let mut head = lock(&self.head);
        if let Some(newest) = expected.first() {
            *head = newest.as_str().to_string();
        }
        Ok(PullReport {
            head: CommitId::new(head.as_str()),
            pulled: expected.len(),
        })
    }

    async fn get_config(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<String>, AutopilotError> {
        let name = format!("{namespace}.{key}");
        self.record(Call::GetConfig(name.clone()));
        Ok(lock(&self.config).get(&name).cloned())
    }

    async fn set_config(
        &self,
        namespace: &str,
        key: &str,
        value: &str,
    ) -> Result<(), AutopilotError> {
        let name = format!("{namespace}.{key}");
        self.record(Call::SetConfig(name.clone(), value.to_string()));
        lock(&self.config).insert(name, value.to_string());
        Ok(())
    }
}

/// Database backup returning a fixed result.
#[derive(Debug)]
pub struct MockDatabase {
    log: CallLog,
    result: Result<String, String>,
}

impl MockDatabase {
    pub fn succeeding(snapshot: &str) -> Self {
        Self {
            log: CallLog::default(),
            result: Ok(snapshot.to_string()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            log: CallLog::default(),
            result: Err(reason.to_string()),
        }
    }

    /// Records into `log` instead of a private history.
    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn backup_count(&self) -> usize {
        lock(&self.log)
            .iter()
            .filter(|c| **c == Call::DbBackup)
            .count()
    }
}

#[async_trait]
impl DatabaseBackup for MockDatabase {
    async fn backup(&self) -> Result<SnapshotId, AutopilotError> {
        lock(&self.log).push(Call::DbBackup);
        self.result
            .clone()
            .map(CommitId::new)
            .map_err(AutopilotError::Database)
    }
}
