//! Background task that drains the activity log into the record store.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::RecordStore;
use crate::domain::{ActivityEntry, ActivityLog};

/// Subscribes to `activity` and spawns a task appending every entry to
/// `records`.
///
/// The subscription is taken before the task starts, so entries logged
/// right after this call are not missed. The task ends when every
/// [`ActivityLog`] handle has been dropped.
pub fn spawn_activity_writer(
    activity: &ActivityLog,
    records: Arc<dyn RecordStore>,
) -> JoinHandle<()> {
    let rx = activity.subscribe();
    tokio::spawn(drain(rx, records))
}

async fn drain(mut rx: broadcast::Receiver<ActivityEntry>, records: Arc<dyn RecordStore>) {
    loop {
        match rx.recv().await {
            Ok(entry) => {
                if let Err(e) = records.append_activity(&entry).await {
                    tracing::error!(error = %e, message = %entry.message, "failed to persist activity entry");
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(lagged = n, "activity writer lagged behind the activity log");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    tracing::debug!("activity writer stopped");
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ActivityCategory;
    use crate::persistence::InMemoryRecordStore;

    #[tokio::test]
    async fn entries_are_persisted_until_the_log_closes() {
        let store = Arc::new(InMemoryRecordStore::new());
        let activity = ActivityLog::new(8);
        let handle = spawn_activity_writer(&activity, Arc::clone(&store) as Arc<dyn RecordStore>);

        activity.log("The daily backup was successful.", ActivityCategory::Backup);
        activity.log("Pulled 1 new commit(s) from origin/main.", ActivityCategory::Pull);
        drop(activity);

        let Ok(()) = handle.await else {
            panic!("writer task panicked");
        };
        let Ok(entries) = store.list_activity(10).await else {
            panic!("list failed");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.first().map(|e| e.category), Some(ActivityCategory::Pull));
    }
}
