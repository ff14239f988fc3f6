//! Service layer: the configuration gate, the remote authenticator, and
//! the two sequencers that orchestrate version-control and database
//! collaborators.
//!
//! [`BackupSequencer`] and [`SyncSequencer`] are the two entry points the
//! scheduler and the HTTP layer trigger.

pub mod authenticator;
pub mod backup_sequencer;
pub mod config_gate;
pub mod sync_sequencer;

pub use authenticator::{AuthDecision, RejectReason, RemoteAuthenticator};
pub use backup_sequencer::BackupSequencer;
pub use config_gate::{ConfigGate, Flag};
pub use sync_sequencer::SyncSequencer;
