//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::persistence::RecordStore;
use crate::scheduler::ScheduleTable;
use crate::service::{BackupSequencer, SyncSequencer};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Automatic backup cycles.
    pub backup: Arc<BackupSequencer>,
    /// Auto-pull cycles.
    pub sync: Arc<SyncSequencer>,
    /// Commit records and persisted activity.
    pub records: Arc<dyn RecordStore>,
    /// Cadences the scheduler knows about.
    pub schedules: Arc<ScheduleTable>,
}
