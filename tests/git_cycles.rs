//! Backup and auto-pull cycles over a real git working tree and a
//! `pg_dump` stand-in script. Skipped when `git` is not on the path.
#![cfg(unix)]
#![allow(clippy::panic)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use vcs_autopilot::database::{DatabaseBackup, PgDumpBackup};
use vcs_autopilot::domain::{ActivityLog, BackupOutcome, CycleLocks};
use vcs_autopilot::persistence::{InMemoryRecordStore, RecordStore};
use vcs_autopilot::service::{BackupSequencer, ConfigGate, SyncSequencer};
use vcs_autopilot::vcs::{GitCli, VersionControl};

const NAMESPACE: &str = "autopilot";

fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

fn git(dir: &Path, args: &[&str]) -> String {
    let Ok(output) = std::process::Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
    else {
        panic!("git {args:?} could not be spawned");
    };
    assert!(
        output.status.success(),
        "git {args:?} failed in {}: {}",
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn identify(dir: &Path) {
    git(dir, &["config", "user.email", "autopilot@example.com"]);
    git(dir, &["config", "user.name", "Autopilot"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

fn write(dir: &Path, name: &str, contents: &str) {
    let Ok(()) = std::fs::write(dir.join(name), contents) else {
        panic!("write {name}");
    };
}

/// A bare remote, the site working tree, and a developer clone, all
/// sharing one history.
struct Fixture {
    root: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        let Ok(root) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let fixture = Self { root };
        let remote = fixture.remote();
        let site = fixture.site();
        for dir in [&remote, &site] {
            let Ok(()) = std::fs::create_dir_all(dir) else {
                panic!("mkdir {}", dir.display());
            };
        }

        git(&remote, &["init", "-q", "--bare"]);
        git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        git(&site, &["init", "-q"]);
        git(&site, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        identify(&site);
        for name in ["index.php", "wp-config.php", "old-plugin.php"] {
            write(&site, name, name);
        }
        git(&site, &["add", "-A"]);
        git(&site, &["commit", "-q", "-m", "init"]);
        let remote_url = remote.display().to_string();
        git(&site, &["remote", "add", "origin", &remote_url]);
        git(&site, &["push", "-q", "origin", "main"]);

        let dev = fixture.dev().display().to_string();
        git(
            fixture.root.path(),
            &["clone", "-q", "-b", "main", &remote_url, &dev],
        );
        identify(&fixture.dev());
        fixture
    }

    fn remote(&self) -> PathBuf {
        self.root.path().join("remote.git")
    }

    fn site(&self) -> PathBuf {
        self.root.path().join("site")
    }

    fn dev(&self) -> PathBuf {
        self.root.path().join("dev")
    }

    /// Writes a `pg_dump` replacement that puts a unique dump at `--file`.
    fn fake_pg_dump(&self) -> PathBuf {
        let script = self.root.path().join("fake-pg_dump");
        let body = "#!/bin/sh\nwhile [ $# -gt 0 ]; do\n  if [ \"$1\" = \"--file\" ]; then shift; echo \"-- dump $$\" > \"$1\"; fi\n  shift\ndone\n";
        write(self.root.path(), "fake-pg_dump", body);
        let Ok(()) = std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
        else {
            panic!("chmod script");
        };
        script
    }

    fn collaborators(&self) -> (Arc<dyn VersionControl>, Arc<dyn DatabaseBackup>) {
        let vcs: Arc<dyn VersionControl> = Arc::new(GitCli::new("git", self.site(), "origin"));
        let db: Arc<dyn DatabaseBackup> = Arc::new(PgDumpBackup::new(
            self.fake_pg_dump(),
            "postgres://localhost/site",
            ".autopilot",
            Arc::clone(&vcs),
        ));
        (vcs, db)
    }

    fn set(&self, key: &str, value: &str) {
        git(&self.site(), &["config", &format!("{NAMESPACE}.{key}"), value]);
    }
}

#[tokio::test]
async fn daily_backup_commits_edits_deletions_and_a_database_dump() {
    if !git_available() {
        return;
    }
    let fixture = Fixture::new();
    let site = fixture.site();
    fixture.set("automatic-backups", "daily");

    write(&site, "index.php", "<?php // edited");
    write(&site, "new-theme.php", "<?php");
    git(&site, &["rm", "-q", "old-plugin.php"]);

    let (vcs, db) = fixture.collaborators();
    let records = Arc::new(InMemoryRecordStore::new());
    let sequencer = BackupSequencer::new(
        Arc::clone(&vcs),
        db,
        Arc::clone(&records) as Arc<dyn RecordStore>,
        ConfigGate::new(Arc::clone(&vcs), NAMESPACE),
        ActivityLog::new(16),
        Arc::new(CycleLocks::new()),
    );

    let Some(date) = NaiveDate::from_ymd_opt(2026, 3, 4) else {
        panic!("date");
    };
    let outcome = sequencer.run_automatic_backup_on(date).await;
    let Ok(BackupOutcome::Completed {
        record_id,
        commit,
        db_snapshot,
        files_changed,
        ..
    }) = outcome
    else {
        panic!("expected a completed backup, got {outcome:?}");
    };
    assert_eq!(files_changed, 3);
    assert_ne!(commit.as_str(), db_snapshot.as_str());

    let Ok(Some(record)) = records.get_record(record_id).await else {
        panic!("record {record_id} missing");
    };
    assert!(record.committed_files.contains(&"old-plugin.php".to_string()));
    assert_eq!(record.db_snapshot(), Some(db_snapshot.clone()));

    let Ok(degraded) = records.list_degraded().await else {
        panic!("list_degraded failed");
    };
    assert!(degraded.is_empty());

    assert!(git(&site, &["status", "--porcelain"]).is_empty());
    assert_eq!(git(&site, &["rev-parse", "HEAD"]), db_snapshot.as_str());
    assert_eq!(
        git(&site, &["log", "-1", "--format=%s", commit.as_str()]),
        "Daily backup - March 4, 2026"
    );
    assert!(git(&site, &["ls-files", "old-plugin.php"]).is_empty());
    assert_eq!(
        git(&site, &["ls-files", ".autopilot/site.sql"]),
        ".autopilot/site.sql"
    );
}

#[tokio::test]
async fn autopull_with_import_checkpoints_then_merges_a_diverged_remote() {
    if !git_available() {
        return;
    }
    let fixture = Fixture::new();
    let site = fixture.site();
    let dev = fixture.dev();
    fixture.set("auto-pull", "true");
    fixture.set("import-pulls", "true");
    fixture.set("token", "s3cret");

    write(&dev, "feature.php", "<?php // from dev");
    git(&dev, &["add", "feature.php"]);
    git(&dev, &["commit", "-q", "-m", "Add feature"]);
    git(&dev, &["push", "-q", "origin", "main"]);
    let pushed = git(&dev, &["rev-parse", "HEAD"]);

    let (vcs, db) = fixture.collaborators();
    let sequencer = SyncSequencer::new(
        Arc::clone(&vcs),
        db,
        ConfigGate::new(Arc::clone(&vcs), NAMESPACE),
        ActivityLog::new(16),
        Arc::new(CycleLocks::new()),
    );

    let outcome = sequencer.run_autopull("s3cret").await;
    let Ok(sync) = outcome else {
        panic!("auto-pull failed: {outcome:?}");
    };
    assert_eq!(sync.branch, "main");
    assert_eq!(
        sync.incoming_commits.first().map(|c| c.as_str().to_string()),
        Some(pushed.clone())
    );
    let Some(checkpoint) = sync.checkpoint else {
        panic!("import-on-pull should checkpoint the database");
    };

    // the checkpoint commit only exists locally, so the pull is a merge
    assert_ne!(sync.head.as_str(), pushed);
    assert_eq!(
        git(&site, &["config", &format!("{NAMESPACE}.last-db-backup")]),
        checkpoint.as_str()
    );
    git(&site, &["merge-base", "--is-ancestor", &pushed, sync.head.as_str()]);
    git(
        &site,
        &["merge-base", "--is-ancestor", checkpoint.as_str(), sync.head.as_str()],
    );
    assert!(site.join("feature.php").exists());
    assert!(site.join(".autopilot/site.sql").exists());
}

#[tokio::test]
async fn autopull_with_nothing_incoming_leaves_the_database_alone() {
    if !git_available() {
        return;
    }
    let fixture = Fixture::new();
    let site = fixture.site();
    fixture.set("auto-pull", "true");
    fixture.set("import-pulls", "true");
    fixture.set("token", "s3cret");
    let before = git(&site, &["rev-parse", "HEAD"]);

    let (vcs, db) = fixture.collaborators();
    let sequencer = SyncSequencer::new(
        Arc::clone(&vcs),
        db,
        ConfigGate::new(Arc::clone(&vcs), NAMESPACE),
        ActivityLog::new(16),
        Arc::new(CycleLocks::new()),
    );

    let outcome = sequencer.run_autopull("s3cret").await;
    let Ok(sync) = outcome else {
        panic!("auto-pull failed: {outcome:?}");
    };
    assert!(sync.incoming_commits.is_empty());
    assert!(sync.checkpoint.is_none());
    assert_eq!(sync.head.as_str(), before);
    assert!(!site.join(".autopilot").exists());
}
