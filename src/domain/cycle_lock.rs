//! Single-flight locking of working trees.
//!
//! Backup and sync cycles both mutate the working tree (stage/commit vs.
//! reset/fetch/pull), so at most one cycle may run per repository at a
//! time. [`CycleLocks`] keeps one [`tokio::sync::Mutex`] per repository
//! path; a cycle that finds the lock held fails fast instead of queueing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::error::AutopilotError;

/// Registry of per-repository cycle locks.
#[derive(Debug, Default)]
pub struct CycleLocks {
    locks: RwLock<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

/// Proof that the caller holds the cycle lock for a repository.
///
/// The lock is released when the guard is dropped.
#[derive(Debug)]
pub struct CycleGuard {
    repo: PathBuf,
    _guard: OwnedMutexGuard<()>,
}

impl CycleGuard {
    /// Repository the guard locks.
    #[must_use]
    pub fn repo(&self) -> &Path {
        &self.repo
    }
}

impl CycleLocks {
    /// Creates an empty lock registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the cycle lock for `repo` without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::CycleInProgress`] if another cycle holds
    /// the lock for the same repository.
    pub async fn try_acquire(&self, repo: &Path) -> Result<CycleGuard, AutopilotError> {
        let lock = self.lock_for(repo).await;
        let guard = lock
            .try_lock_owned()
            .map_err(|_| AutopilotError::CycleInProgress(repo.display().to_string()))?;
        Ok(CycleGuard {
            repo: repo.to_path_buf(),
            _guard: guard,
        })
    }

    async fn lock_for(&self, repo: &Path) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(repo) {
            return Arc::clone(lock);
        }
        let mut map = self.locks.write().await;
        Arc::clone(map.entry(repo.to_path_buf()).or_default())
    }
}
