//! Cadence table: cadence name to interval definition.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

/// Seconds in one week.
pub const WEEKLY_INTERVAL_SECS: u64 = 604_800;

/// How often a cadence fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct IntervalDefinition {
    /// Period in seconds.
    pub interval_secs: u64,
    /// Label shown to operators.
    pub display: String,
}

impl IntervalDefinition {
    fn new(interval_secs: u64, display: &str) -> Self {
        Self {
            interval_secs,
            display: display.to_string(),
        }
    }
}

/// Cadence name to definition.
pub type ScheduleTable = BTreeMap<String, IntervalDefinition>;

/// The cadences every scheduler starts with.
#[must_use]
pub fn base_table() -> ScheduleTable {
    BTreeMap::from([
        ("hourly".to_string(), IntervalDefinition::new(3_600, "Once Hourly")),
        (
            "twicedaily".to_string(),
            IntervalDefinition::new(43_200, "Twice Daily"),
        ),
        ("daily".to_string(), IntervalDefinition::new(86_400, "Once Daily")),
    ])
}

/// Adds the `weekly` cadence to `table`, replacing any existing entry.
#[must_use]
pub fn register_interval(mut table: ScheduleTable) -> ScheduleTable {
    table.insert(
        "weekly".to_string(),
        IntervalDefinition::new(WEEKLY_INTERVAL_SECS, "Weekly"),
    );
    table
}

/// [`base_table`] with the registered extensions applied.
#[must_use]
pub fn default_table() -> ScheduleTable {
    register_interval(base_table())
}
