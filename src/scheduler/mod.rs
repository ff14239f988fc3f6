//! Time-based triggering of automatic backups.
//!
//! [`intervals`] holds the cadence table (with the `weekly` entry added by
//! [`register_interval`]); [`runner`] spawns the tokio task that fires the
//! backup sequencer whenever the configured cadence is due.

pub mod intervals;
pub mod runner;

pub use intervals::{IntervalDefinition, ScheduleTable, base_table, default_table, register_interval};
pub use runner::BackupScheduler;
