//! [`VersionControl`] adapter that shells out to the `git` binary.

use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;

use super::{CommitOutcome, PullReport, VersionControl};
use crate::domain::CommitId;
use crate::error::AutopilotError;

/// Runs `git -C <repo> …` for every operation.
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: PathBuf,
    repo: PathBuf,
    remote: String,
}

impl GitCli {
    /// Creates an adapter for the working tree at `repo`.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>, repo: impl Into<PathBuf>, remote: &str) -> Self {
        Self {
            binary: binary.into(),
            repo: repo.into(),
            remote: remote.to_string(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<Output, AutopilotError> {
        Command::new(&self.binary)
            .arg("-C")
            .arg(&self.repo)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                AutopilotError::VersionControl(format!(
                    "failed to run git {}: {e}",
                    args.first().unwrap_or(&"")
                ))
            })
    }

    /// Runs a command that must exit 0 and returns its trimmed stdout.
    async fn run_ok(&self, args: &[&str]) -> Result<String, AutopilotError> {
        let output = self.run(args).await?;
        if !output.status.success() {
            return Err(command_failed(args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn command_failed(args: &[&str], output: &Output) -> AutopilotError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    AutopilotError::VersionControl(format!(
        "git {} exited with {}: {}",
        args.join(" "),
        output.status,
        stderr.trim()
    ))
}

/// Parses `git status --porcelain=v1 -z` output into changed paths.
///
/// Rename and copy entries are followed by the original path, which is
/// skipped: the new path is what gets staged.
fn parse_porcelain(raw: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut entries = raw.split('\0');
    while let Some(entry) = entries.next() {
        let (Some(code), Some(path)) = (entry.get(..2), entry.get(3..)) else {
            continue;
        };
        if !path.is_empty() {
            paths.push(path.to_string());
        }
        if code.contains('R') || code.contains('C') {
            let _ = entries.next();
        }
    }
    paths
}

#[async_trait]
impl VersionControl for GitCli {
    fn repo_path(&self) -> &Path {
        &self.repo
    }

    fn remote_name(&self) -> &str {
        &self.remote
    }

    async fn status(&self) -> Result<Vec<String>, AutopilotError> {
        let args = ["status", "--porcelain=v1", "-z", "--untracked-files=all"];
        let output = self.run(&args).await?;
        if !output.status.success() {
            return Err(command_failed(&args, &output));
        }
        Ok(parse_porcelain(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn stage(&self, paths: &[String]) -> Result<(), AutopilotError> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut present = Vec::new();
        let mut missing = Vec::new();
        for path in paths {
            if tokio::fs::symlink_metadata(self.repo.join(path)).await.is_ok() {
                present.push(path.as_str());
            } else {
                missing.push(path.as_str());
            }
        }

        // deleted paths: `add` rejects a pathspec already gone from the index
        if !missing.is_empty() {
            let mut args = vec!["rm", "--cached", "--quiet", "--ignore-unmatch", "--"];
            args.extend(missing);
            self.run_ok(&args).await?;
        }
        if !present.is_empty() {
            let mut args = vec!["add", "-A", "--"];
            args.extend(present);
            self.run_ok(&args).await?;
        }
        Ok(())
    }

    async fn commit(&self, message: &str) -> Result<CommitOutcome, AutopilotError> {
        // exit 0: index matches HEAD, exit 1: staged changes present
        let staged = ["diff", "--cached", "--quiet"];
        let output = self.run(&staged).await?;
        match output.status.code() {
            Some(0) => return Ok(CommitOutcome::NothingToCommit),
            Some(1) => {}
            _ => return Err(command_failed(&staged, &output)),
        }

        self.run_ok(&["commit", "--quiet", "-m", message]).await?;
        let head = self.current_commit().await?;
        tracing::debug!(commit = %head.short(), "created commit");
        Ok(CommitOutcome::Committed(head))
    }

    async fn current_commit(&self) -> Result<CommitId, AutopilotError> {
        self.run_ok(&["rev-parse", "HEAD"]).await.map(CommitId::new)
    }

    async fn branch_name(&self) -> Result<String, AutopilotError> {
        self.run_ok(&["rev-parse", "--abbrev-ref", "HEAD"]).await
    }

    async fn reset(&self) -> Result<(), AutopilotError> {
        self.run_ok(&["reset", "--hard", "--quiet", "HEAD"])
            .await
            .map(|_| ())
    }

    async fn fetch(&self) -> Result<(), AutopilotError> {
        self.run_ok(&["fetch", "--quiet", self.remote.as_str()])
            .await
            .map(|_| ())
    }

    async fn log_range(&self, from: &str, to: &str) -> Result<Vec<CommitId>, AutopilotError> {
        let range = format!("{from}..{to}");
        let stdout = self
            .run_ok(&["log", "--pretty=format:%H", range.as_str()])
            .await?;
        Ok(stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(CommitId::new)
            .collect())
    }

    async fn pull(&self, expected: &[CommitId]) -> Result<PullReport, AutopilotError> {
        let branch = self.branch_name().await?;
        let args = [
            "pull",
            "--no-rebase",
            "--no-edit",
            "--quiet",
            self.remote.as_str(),
            branch.as_str(),
        ];
        self.run_ok(&args).await?;
        let head = self.current_commit().await?;

        if let Some(newest) = expected.first() {
            let ancestry = ["merge-base", "--is-ancestor", newest.as_str(), head.as_str()];
            let output = self.run(&ancestry).await?;
            match output.status.code() {
                Some(0) => {}
                Some(1) => {
                    return Err(AutopilotError::VersionControl(format!(
                        "pull finished but {} is not reachable from {}",
                        newest.short(),
                        head.short()
                    )));
                }
                _ => return Err(command_failed(&ancestry, &output)),
            }
        }

        Ok(PullReport {
            head,
            pulled: expected.len(),
        })
    }

    async fn get_config(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<String>, AutopilotError> {
        let name = format!("{namespace}.{key}");
        let args = ["config", "--get", name.as_str()];
        let output = self.run(&args).await?;
        match output.status.code() {
            Some(0) => Ok(Some(
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
            )),
            // key not set
            Some(1) => Ok(None),
            _ => Err(command_failed(&args, &output)),
        }
    }

    async fn set_config(
        &self,
        namespace: &str,
        key: &str,
        value: &str,
    ) -> Result<(), AutopilotError> {
        let name = format!("{namespace}.{key}");
        self.run_ok(&["config", name.as_str(), value]).await.map(|_| ())
    }
}
