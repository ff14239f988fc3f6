//! Domain layer: identifiers, policies, records, outcomes, and the
//! primitives shared by both sequencers.
//!
//! This module holds the types that flow between the sequencers and
//! their collaborators: the resolved backup policy, the working-tree
//! snapshot, the commit record, the remote token, the activity log, and
//! the per-repository cycle locks.

pub mod activity;
pub mod commit_record;
pub mod cycle_lock;
pub mod outcome;
pub mod policy;
pub mod record_id;
pub mod snapshot;
pub mod token;

pub use activity::{ActivityCategory, ActivityEntry, ActivityLog};
pub use commit_record::{CommitRecord, DB_SNAPSHOT_KEY, NewCommitRecord};
pub use cycle_lock::{CycleGuard, CycleLocks};
pub use outcome::{BackupOutcome, SyncOutcome};
pub use policy::{BackupPolicy, CadenceClass, backup_commit_message};
pub use record_id::{CommitId, RecordId, SnapshotId};
pub use snapshot::WorkingTreeSnapshot;
pub use token::RemoteToken;
