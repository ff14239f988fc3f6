//! Scheduler background loop.
//!
//! Spawns a tokio task that wakes every tick, resolves the backup policy,
//! and runs the backup sequencer when the configured cadence is due.
//! Last-run times are kept in memory, so the first due tick after a
//! restart always runs.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::intervals::ScheduleTable;
use crate::domain::{BackupOutcome, BackupPolicy};
use crate::error::AutopilotError;
use crate::service::{BackupSequencer, ConfigGate};

/// Fires automatic backups at the configured cadence.
#[derive(Debug)]
pub struct BackupScheduler {
    sequencer: Arc<BackupSequencer>,
    gate: ConfigGate,
    table: ScheduleTable,
    tick: Duration,
    last_run: Option<Instant>,
}

impl BackupScheduler {
    /// Creates a scheduler over `table` that wakes every `tick`.
    #[must_use]
    pub fn new(
        sequencer: Arc<BackupSequencer>,
        gate: ConfigGate,
        table: ScheduleTable,
        tick: Duration,
    ) -> Self {
        Self {
            sequencer,
            gate,
            table,
            tick,
            last_run: None,
        }
    }

    /// Runs one scheduler tick at `now`.
    ///
    /// Returns `None` when nothing was due, otherwise the backup result.
    pub async fn tick(&mut self, now: Instant) -> Option<Result<BackupOutcome, AutopilotError>> {
        let BackupPolicy::Cadence(cadence) = self.gate.resolve_backup_policy().await else {
            return None;
        };
        let Some(definition) = self.table.get(cadence.as_str()) else {
            warn!(cadence = %cadence, "unknown backup cadence, skipping");
            return None;
        };
        let interval = Duration::from_secs(definition.interval_secs);
        let due = self
            .last_run
            .is_none_or(|last| now.saturating_duration_since(last) >= interval);
        if !due {
            debug!(cadence = %cadence, "backup not due yet");
            return None;
        }

        let result = self.sequencer.run_automatic_backup().await;
        // failed or deferred cycles are retried on the next tick
        if result.is_ok() {
            self.last_run = Some(now);
        }
        Some(result)
    }

    /// Spawns the scheduler loop onto the tokio runtime.
    pub fn spawn(mut self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(tick_secs = self.tick.as_secs(), "backup scheduler started");
            loop {
                let now = ticker.tick().await;
                match self.tick(now).await {
                    None => {}
                    Some(Ok(outcome)) => info!(?outcome, "scheduled backup finished"),
                    Some(Err(AutopilotError::CycleInProgress(repo))) => {
                        warn!(%repo, "scheduled backup deferred, another cycle is running");
                    }
                    Some(Err(e)) => error!(error = %e, "scheduled backup failed"),
                }
            }
        })
    }
}
