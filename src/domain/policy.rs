//! Backup policy resolved from persisted configuration.
//!
//! A [`BackupPolicy`] is never stored on its own: it is derived at the
//! start of each backup cycle from the `automatic-backups` setting. Any
//! absent or falsy value resolves to [`BackupPolicy::None`], so a missing
//! setting can never turn on silent backups.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Values of `automatic-backups` that mean "disabled".
const FALSY_VALUES: [&str; 5] = ["", "none", "0", "false", "off"];

/// A named backup frequency such as `daily` or `weekly`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CadenceClass(String);

impl CadenceClass {
    /// Creates a cadence class, normalizing to trimmed lowercase.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_ascii_lowercase())
    }

    /// Returns the class name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the class name with its first letter upper-cased.
    #[must_use]
    pub fn capitalized(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for CadenceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether, and at which cadence, automatic backups run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "policy", content = "cadence", rename_all = "snake_case")]
pub enum BackupPolicy {
    /// Automatic backups are disabled.
    None,
    /// Automatic backups run at the given cadence.
    Cadence(CadenceClass),
}

impl BackupPolicy {
    /// Resolves a policy from the raw `automatic-backups` value.
    #[must_use]
    pub fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if !FALSY_VALUES.contains(&v.to_ascii_lowercase().as_str()) => {
                Self::Cadence(CadenceClass::new(v))
            }
            _ => Self::None,
        }
    }

    /// Returns the cadence class, if backups are enabled.
    #[must_use]
    pub fn cadence(&self) -> Option<&CadenceClass> {
        match self {
            Self::None => None,
            Self::Cadence(class) => Some(class),
        }
    }
}

/// Builds the backup commit message, e.g. `"Weekly backup - March 4, 2026"`.
#[must_use]
pub fn backup_commit_message(class: &CadenceClass, date: NaiveDate) -> String {
    format!("{} backup - {}", class.capitalized(), date.format("%B %-d, %Y"))
}
