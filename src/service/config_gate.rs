//! Read-only access to the persisted behavior switches.

use std::sync::Arc;

use crate::domain::{BackupPolicy, RemoteToken};
use crate::vcs::VersionControl;

/// Setting holding the automatic backup cadence class.
pub const AUTOMATIC_BACKUPS_KEY: &str = "automatic-backups";
/// Setting enabling auto-pull.
pub const AUTO_PULL_KEY: &str = "auto-pull";
/// Setting enabling a database backup before each pull.
pub const IMPORT_PULLS_KEY: &str = "import-pulls";
/// Setting holding the local copy of the remote token.
pub const TOKEN_KEY: &str = "token";
/// Setting written with the pre-pull database checkpoint.
pub const LAST_DB_BACKUP_KEY: &str = "last-db-backup";

/// The only value that enables a [`Flag`].
pub const ENABLED_VALUE: &str = "true";

/// Boolean switches read by the sync sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// `auto-pull`
    AutoPull,
    /// `import-pulls`
    ImportPulls,
}

impl Flag {
    /// Persisted key of the flag.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::AutoPull => AUTO_PULL_KEY,
            Self::ImportPulls => IMPORT_PULLS_KEY,
        }
    }
}

/// Resolves persisted settings into typed decisions.
///
/// The gate never fails: an unreadable setting is logged and treated as
/// absent, which always resolves to the disabled default.
#[derive(Debug, Clone)]
pub struct ConfigGate {
    vcs: Arc<dyn VersionControl>,
    namespace: String,
}

impl ConfigGate {
    /// Creates a gate reading `<namespace>.<key>` settings through `vcs`.
    #[must_use]
    pub fn new(vcs: Arc<dyn VersionControl>, namespace: &str) -> Self {
        Self {
            vcs,
            namespace: namespace.to_string(),
        }
    }

    /// Namespace of the settings.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Resolves the automatic backup policy.
    pub async fn resolve_backup_policy(&self) -> BackupPolicy {
        BackupPolicy::from_setting(self.read(AUTOMATIC_BACKUPS_KEY).await.as_deref())
    }

    /// Returns `true` only if the flag is exactly [`ENABLED_VALUE`].
    pub async fn resolve_flag(&self, flag: Flag) -> bool {
        self.read(flag.key()).await.as_deref() == Some(ENABLED_VALUE)
    }

    /// Returns the locally stored remote token, if one is set.
    pub async fn stored_token(&self) -> Option<RemoteToken> {
        self.read(TOKEN_KEY)
            .await
            .and_then(|value| RemoteToken::new(&value))
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.vcs.get_config(&self.namespace, key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "cannot read setting, using default");
                None
            }
        }
    }
}
