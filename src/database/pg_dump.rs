//! PostgreSQL backup via `pg_dump`, committed into the working tree.
//!
//! The dump is written to `<repo>/<dump_dir>/<database>.sql` and committed
//! through the same [`VersionControl`] collaborator the sequencers use.
//! The resulting commit hash is the snapshot id, so every database
//! snapshot can be checked out from history.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use super::DatabaseBackup;
use crate::domain::SnapshotId;
use crate::error::AutopilotError;
use crate::vcs::{CommitOutcome, VersionControl};

/// Commit message used for database dump commits.
pub const DUMP_COMMIT_MESSAGE: &str = "Backed up the database";

/// `pg_dump` based [`DatabaseBackup`].
#[derive(Debug, Clone)]
pub struct PgDumpBackup {
    binary: PathBuf,
    database_url: String,
    dump_dir: String,
    vcs: Arc<dyn VersionControl>,
}

impl PgDumpBackup {
    /// Creates a backup adapter.
    ///
    /// `dump_dir` is relative to the working tree of `vcs`.
    #[must_use]
    pub fn new(
        binary: impl Into<PathBuf>,
        database_url: &str,
        dump_dir: &str,
        vcs: Arc<dyn VersionControl>,
    ) -> Self {
        Self {
            binary: binary.into(),
            database_url: database_url.to_string(),
            dump_dir: dump_dir.trim_matches('/').to_string(),
            vcs,
        }
    }

    /// Path of the dump relative to the working tree.
    #[must_use]
    pub fn dump_path(&self) -> String {
        let file = format!("{}.sql", database_name(&self.database_url));
        if self.dump_dir.is_empty() {
            file
        } else {
            format!("{}/{file}", self.dump_dir)
        }
    }

    async fn run_pg_dump(&self, target: &std::path::Path) -> Result<(), AutopilotError> {
        let output = Command::new(&self.binary)
            .arg("--no-owner")
            .arg("--file")
            .arg(target)
            .arg("--dbname")
            .arg(&self.database_url)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AutopilotError::Database(format!("failed to run pg_dump: {e}")))?;
        if !output.status.success() {
            return Err(AutopilotError::Database(format!(
                "pg_dump exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

/// Extracts the database name from a connection URL, falling back to
/// `database`.
fn database_name(url: &str) -> &str {
    let without_query = url.split('?').next().unwrap_or(url);
    let after_authority = without_query
        .split_once("://")
        .map_or(without_query, |(_, rest)| rest);
    match after_authority.rsplit_once('/') {
        Some((_, name)) if !name.is_empty() => name,
        _ => "database",
    }
}

#[async_trait]
impl DatabaseBackup for PgDumpBackup {
    async fn backup(&self) -> Result<SnapshotId, AutopilotError> {
        let relative = self.dump_path();
        let target = self.vcs.repo_path().join(&relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AutopilotError::Database(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        self.run_pg_dump(&target).await?;
        tracing::info!(path = %relative, "database dumped");

        self.vcs.stage(std::slice::from_ref(&relative)).await?;
        match self.vcs.commit(DUMP_COMMIT_MESSAGE).await? {
            CommitOutcome::Committed(id) => Ok(id),
            // dump identical to the last one
            CommitOutcome::NothingToCommit => self.vcs.current_commit().await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::testing::{Call, MockVcs};

    #[test]
    fn database_name_from_url() {
        assert_eq!(database_name("postgres://u:p@localhost:5432/site"), "site");
        assert_eq!(
            database_name("postgres://u:p@localhost/site?sslmode=require"),
            "site"
        );
        assert_eq!(database_name("postgres://localhost"), "database");
        assert_eq!(database_name("postgres://localhost/"), "database");
    }

    #[test]
    fn dump_path_is_relative_to_repo() {
        let vcs = Arc::new(MockVcs::new());
        let backup = PgDumpBackup::new("pg_dump", "postgres://h/site", "/.autopilot/", vcs);
        assert_eq!(backup.dump_path(), ".autopilot/site.sql");
    }

    #[tokio::test]
    async fn missing_binary_is_a_database_error_and_commits_nothing() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let vcs = Arc::new(MockVcs::new().with_repo(dir.path()));
        let backup = PgDumpBackup::new(
            dir.path().join("no-such-pg_dump"),
            "postgres://h/site",
            ".autopilot",
            Arc::clone(&vcs) as Arc<dyn VersionControl>,
        );

        let result = backup.backup().await;
        assert!(matches!(result, Err(AutopilotError::Database(_))));
        assert!(
            !vcs.calls()
                .iter()
                .any(|c| matches!(c, Call::Stage(_) | Call::Commit(_)))
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn dump_is_committed_and_its_commit_is_the_snapshot_id() {
        use std::os::unix::fs::PermissionsExt;

        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let script = dir.path().join("fake-pg_dump");
        let body = "#!/bin/sh\nwhile [ $# -gt 0 ]; do\n  if [ \"$1\" = \"--file\" ]; then shift; echo '-- dump' > \"$1\"; fi\n  shift\ndone\n";
        let Ok(()) = std::fs::write(&script, body) else {
            panic!("write script");
        };
        let Ok(()) = std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
        else {
            panic!("chmod script");
        };

        let repo = dir.path().join("repo");
        let vcs = Arc::new(MockVcs::new().with_repo(&repo).with_next_commit("db0001"));
        let backup = PgDumpBackup::new(
            &script,
            "postgres://h/site",
            ".autopilot",
            Arc::clone(&vcs) as Arc<dyn VersionControl>,
        );

        let Ok(id) = backup.backup().await else {
            panic!("backup failed");
        };
        assert_eq!(id.as_str(), "db0001");
        assert!(repo.join(".autopilot/site.sql").exists());
        assert_eq!(
            vcs.calls(),
            vec![
                Call::Stage(vec![".autopilot/site.sql".to_string()]),
                Call::Commit(DUMP_COMMIT_MESSAGE.to_string()),
            ]
        );
    }
}
