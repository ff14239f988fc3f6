//! # vcs-autopilot
//!
//! Scheduled automatic backups and token-authenticated auto-pull for a
//! git working tree and the database that goes with it.
//!
//! Two cycles drive everything:
//!
//! - **Backup**: on the configured cadence, commit every changed file,
//!   record the commit, dump the database, and attach the dump's commit to
//!   the record.
//! - **Auto-pull**: when a webhook presents the shared token, discard local
//!   changes, fetch, checkpoint the database when import-on-pull is on,
//!   and pull.
//!
//! Both cycles read their switches from the repository's own config on
//! every run and never overlap on the same working tree.
//!
//! ## Architecture
//!
//! ```text
//! Webhook / operator (HTTP)        Scheduler (tokio interval)
//!     │                                 │
//!     ├── REST Handlers (api/)          │
//!     │                                 │
//!     ├── SyncSequencer ─┐   ┌── BackupSequencer
//!     │                  │   │
//!     ├── ConfigGate, RemoteAuthenticator (service/)
//!     ├── CycleLocks, ActivityLog (domain/)
//!     │
//!     ├── VersionControl ── GitCli (vcs/)
//!     ├── DatabaseBackup ── PgDumpBackup (database/)
//!     ├── Timeout decorators (deadline)
//!     │
//!     └── RecordStore ── PostgreSQL / in-memory (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod database;
pub mod deadline;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod scheduler;
pub mod service;
pub mod vcs;

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod testing;
