//! Human-readable activity log.
//!
//! [`ActivityLog`] wraps a [`tokio::sync::broadcast`] channel. Sequencers
//! publish an [`ActivityEntry`] for every externally visible outcome; a
//! background task subscribes and persists the entries to the record
//! store. Every entry is also emitted as a `tracing` event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use utoipa::ToSchema;

/// Category of an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    /// Automatic backup outcomes.
    Backup,
    /// Auto-pull outcomes.
    Pull,
    /// Failures that need an operator.
    Error,
}

impl ActivityCategory {
    /// Returns the category as a static string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backup => "backup",
            Self::Pull => "pull",
            Self::Error => "error",
        }
    }

    /// Parses a stored category string.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "backup" => Some(Self::Backup),
            "pull" => Some(Self::Pull),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// One line of the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActivityEntry {
    /// Log message.
    pub message: String,
    /// Entry category.
    pub category: ActivityCategory,
    /// When the entry was logged.
    pub timestamp: DateTime<Utc>,
}

/// Broadcast bus for [`ActivityEntry`]s.
///
/// When the ring buffer is full, the oldest entries are dropped for
/// lagging receivers.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    sender: broadcast::Sender<ActivityEntry>,
}

impl ActivityLog {
    /// Creates a new `ActivityLog` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Logs a message under `category`.
    ///
    /// Returns the number of receivers that received the entry.
    pub fn log(&self, message: impl Into<String>, category: ActivityCategory) -> usize {
        let entry = ActivityEntry {
            message: message.into(),
            category,
            timestamp: Utc::now(),
        };
        match category {
            ActivityCategory::Error => {
                tracing::error!(category = category.as_str(), "{}", entry.message);
            }
            ActivityCategory::Backup | ActivityCategory::Pull => {
                tracing::info!(category = category.as_str(), "{}", entry.message);
            }
        }
        self.sender.send(entry).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future entries.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ActivityEntry> {
        self.sender.subscribe()
    }
}
