//! Auto-pull: authenticate the caller, then reset, fetch, checkpoint, and
//! pull.
//!
//! Nothing that mutates the working tree runs before the caller is
//! authenticated. When import-on-pull is enabled the database is backed up
//! and the checkpoint is persisted before the pull, since the pull is the
//! step the checkpoint protects against.

use std::sync::Arc;

use super::authenticator::{AuthDecision, RemoteAuthenticator};
use super::config_gate::{ConfigGate, Flag, LAST_DB_BACKUP_KEY};
use crate::database::DatabaseBackup;
use crate::domain::{ActivityCategory, ActivityLog, CycleLocks, SnapshotId, SyncOutcome};
use crate::error::AutopilotError;
use crate::vcs::VersionControl;

/// Runs auto-pull cycles.
#[derive(Debug, Clone)]
pub struct SyncSequencer {
    vcs: Arc<dyn VersionControl>,
    db: Arc<dyn DatabaseBackup>,
    gate: ConfigGate,
    authenticator: RemoteAuthenticator,
    activity: ActivityLog,
    locks: Arc<CycleLocks>,
}

impl SyncSequencer {
    /// Creates a sequencer over the given collaborators.
    #[must_use]
    pub fn new(
        vcs: Arc<dyn VersionControl>,
        db: Arc<dyn DatabaseBackup>,
        gate: ConfigGate,
        activity: ActivityLog,
        locks: Arc<CycleLocks>,
    ) -> Self {
        let authenticator = RemoteAuthenticator::new(gate.clone());
        Self {
            vcs,
            db,
            gate,
            authenticator,
            activity,
            locks,
        }
    }

    /// Runs one auto-pull cycle on behalf of a caller presenting
    /// `presented_token`.
    ///
    /// # Errors
    ///
    /// - [`AutopilotError::AccessDenied`] if auto-pull is not enabled.
    /// - [`AutopilotError::AuthenticationFailed`] if the token is rejected.
    /// - [`AutopilotError::CycleInProgress`] if another cycle holds the
    ///   working tree.
    /// - The collaborator error of the first failing step after that. A
    ///   failed pull is not rolled back; the checkpoint stays in place.
    pub async fn run_autopull(&self, presented_token: &str) -> Result<SyncOutcome, AutopilotError> {
        if !self.gate.resolve_flag(Flag::AutoPull).await {
            tracing::warn!("auto-pull triggered while disabled");
            return Err(AutopilotError::AccessDenied);
        }

        if let AuthDecision::Rejected(reason) =
            self.authenticator.authenticate(presented_token).await
        {
            tracing::warn!(%reason, "auto-pull trigger rejected");
            return Err(AutopilotError::AuthenticationFailed(reason.to_string()));
        }

        let _guard = self.locks.try_acquire(self.vcs.repo_path()).await?;

        self.vcs.reset().await?;
        self.vcs.fetch().await?;

        let branch = self.vcs.branch_name().await?;
        let upstream = format!("{}/{branch}", self.vcs.remote_name());
        let incoming = self.vcs.log_range(&branch, &upstream).await?;
        if incoming.is_empty() {
            tracing::info!(%upstream, "already up to date");
            let head = self.vcs.current_commit().await?;
            return Ok(SyncOutcome {
                branch,
                incoming_commits: incoming,
                checkpoint: None,
                head,
            });
        }
        tracing::info!(%upstream, incoming = incoming.len(), "remote has new commits");

        let checkpoint = if self.gate.resolve_flag(Flag::ImportPulls).await {
            Some(self.checkpoint_database().await?)
        } else {
            None
        };

        let report = match self.vcs.pull(&incoming).await {
            Ok(report) => report,
            Err(e) => {
                let hint = checkpoint
                    .as_ref()
                    .map(|id| format!(" Database checkpoint: {}.", id.short()))
                    .unwrap_or_default();
                self.activity.log(
                    format!("Error pulling changes from {upstream}: {e}.{hint}"),
                    ActivityCategory::Error,
                );
                return Err(e);
            }
        };

        self.activity.log(
            format!("Pulled {} new commit(s) from {upstream}.", report.pulled),
            ActivityCategory::Pull,
        );

        Ok(SyncOutcome {
            branch,
            incoming_commits: incoming,
            checkpoint,
            head: report.head,
        })
    }

    /// Backs up the database and persists the snapshot id as the
    /// last-known-good checkpoint.
    async fn checkpoint_database(&self) -> Result<SnapshotId, AutopilotError> {
        let snapshot = self.db.backup().await?;
        self.vcs
            .set_config(self.gate.namespace(), LAST_DB_BACKUP_KEY, snapshot.as_str())
            .await?;
        tracing::info!(checkpoint = %snapshot.short(), "database checkpoint saved");
        Ok(snapshot)
    }
}
