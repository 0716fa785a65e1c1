//! Moving the current-version marker back to an earlier version

use crate::config::VersionManagementConfig;
use crate::error::{DataverError, Result};
use crate::metadata::BackupNote;
use crate::persist;
use crate::store::VersionStore;
use crate::version::VersionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the rollback audit trail inside the logs directory
pub const ROLLBACK_HISTORY_FILE: &str = "rollback_history.json";

/// One entry of the rollback audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackRecord {
    pub timestamp: DateTime<Utc>,
    pub from_version: Option<VersionId>,
    pub to_version: VersionId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollbackHistory {
    #[serde(default)]
    pub rollbacks: Vec<RollbackRecord>,
}

/// Outcome of a pre-rollback check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyCheck {
    pub safe: bool,
    pub reason: String,
}

impl SafetyCheck {
    fn unsafe_because(reason: impl Into<String>) -> Self {
        Self {
            safe: false,
            reason: reason.into(),
        }
    }
}

pub struct RollbackManager<'a> {
    store: &'a VersionStore,
    config: VersionManagementConfig,
    history_path: PathBuf,
}

impl<'a> RollbackManager<'a> {
    pub fn new(store: &'a VersionStore, config: VersionManagementConfig) -> Self {
        let history_path = store.storage().logs_dir.join(ROLLBACK_HISTORY_FILE);
        Self {
            store,
            config,
            history_path,
        }
    }

    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    /// Check whether `target` can become the current version
    pub fn is_safe(&self, target: VersionId) -> Result<SafetyCheck> {
        match self.ensure_safe(target) {
            Ok(()) => Ok(SafetyCheck {
                safe: true,
                reason: "Safe to rollback".to_string(),
            }),
            Err(e) if e.is_not_found() || e.is_validation() => {
                Ok(SafetyCheck::unsafe_because(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Like [`is_safe`](Self::is_safe), but reports an unsafe target as the
    /// matching error
    pub fn ensure_safe(&self, target: VersionId) -> Result<()> {
        self.validate_target(target)?;
        if !self.store.metadata_path(target).exists() {
            return Err(DataverError::MetadataNotFound { version: target });
        }
        Ok(())
    }

    /// Target must exist and differ from the current version. Returns the
    /// current version.
    fn validate_target(&self, target: VersionId) -> Result<Option<VersionId>> {
        if !self.store.get_all_versions()?.contains(&target) {
            return Err(DataverError::VersionNotFound { version: target });
        }

        let current = self.store.get_current_version()?;
        if current == Some(target) {
            return Err(DataverError::AlreadyAtVersion { version: target });
        }
        Ok(current)
    }

    /// Make `target` current. Returns the version that was current before.
    ///
    /// Backup annotation and audit logging are best effort; only failing to
    /// move the marker is an error.
    pub fn rollback(&self, target: VersionId, create_backup: bool) -> Result<Option<VersionId>> {
        let current = match self.validate_target(target) {
            Ok(current) => current,
            Err(e) => {
                log::error!("Cannot roll back to {}: {}", target, e);
                return Err(e);
            }
        };

        log::info!(
            "Starting rollback from {} to {}",
            display_version(current),
            target
        );

        if create_backup && self.config.backup_before_rollback {
            match current {
                Some(current) => self.annotate_backup(current),
                None => log::debug!("No current version; skipping pre-rollback backup"),
            }
        }

        self.store.set_current_version(target)?;

        if let Err(e) = self.append_history(current, target) {
            log::warn!("Failed to log rollback event: {}", e);
        }

        log::info!("Successfully rolled back to {}", target);
        Ok(current)
    }

    fn annotate_backup(&self, version: VersionId) {
        let result = self.store.get_version_metadata(version).and_then(|mut metadata| {
            metadata.backups.push(BackupNote::pre_rollback(version));
            self.store.save_version_metadata(&metadata)
        });

        match result {
            Ok(()) => log::info!("Created backup for {}", version),
            Err(e) => log::warn!("Failed to create backup for {}: {}", version, e),
        }
    }

    /// Append one record. An unreadable existing file is reported, never
    /// replaced.
    fn append_history(&self, from_version: Option<VersionId>, to_version: VersionId) -> Result<()> {
        let mut history: RollbackHistory = if self.history_path.exists() {
            persist::read_json(&self.history_path)?
        } else {
            RollbackHistory::default()
        };
        history.rollbacks.push(RollbackRecord {
            timestamp: Utc::now(),
            from_version,
            to_version,
        });
        persist::write_json(&self.history_path, &history)?;
        log::info!(
            "Logged rollback event: {} -> {}",
            display_version(from_version),
            to_version
        );
        Ok(())
    }

    fn load_history(&self) -> RollbackHistory {
        if !self.history_path.exists() {
            return RollbackHistory::default();
        }
        match persist::read_json(&self.history_path) {
            Ok(history) => history,
            Err(e) => {
                log::error!(
                    "Failed to read rollback history {}: {}",
                    self.history_path.display(),
                    e
                );
                RollbackHistory::default()
            }
        }
    }

    /// All rollbacks, oldest first
    pub fn get_rollback_history(&self) -> Vec<RollbackRecord> {
        self.load_history().rollbacks
    }
}

fn display_version(version: Option<VersionId>) -> String {
    version.map_or_else(|| "none".to_string(), |v| v.to_string())
}
