//! The append-only index of all versions

use crate::error::{DataverError, Result};
use crate::metadata::VersionMetadata;
use crate::persist;
use crate::version::VersionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Summary of one version as recorded in the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub version: VersionId,
    pub created_at: DateTime<Utc>,
    pub row_count: Option<u64>,
    pub column_count: Option<usize>,
    pub quality_score: Option<f64>,
    pub file_hash: Option<String>,
}

impl From<&VersionMetadata> for IndexEntry {
    fn from(metadata: &VersionMetadata) -> Self {
        Self {
            version: metadata.version,
            created_at: metadata.created_at,
            row_count: metadata.row_count,
            column_count: metadata.column_count,
            quality_score: metadata.quality_score,
            file_hash: metadata.file_hash.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionIndex {
    pub versions: Vec<IndexEntry>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for VersionIndex {
    fn default() -> Self {
        Self {
            versions: Vec::new(),
            created_at: Utc::now(),
            last_updated: None,
        }
    }
}

impl VersionIndex {
    /// Load the index, or start a new one if the file does not exist yet
    pub fn load_or_new(path: &Path) -> Result<Self> {
        if path.exists() {
            persist::read_json(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        persist::write_json(path, self)
    }

    pub fn latest(&self) -> Option<&IndexEntry> {
        self.versions.last()
    }

    pub fn get(&self, version: VersionId) -> Option<&IndexEntry> {
        self.versions.iter().find(|entry| entry.version == version)
    }

    /// Append an entry, keeping identifiers strictly increasing
    pub fn append(&mut self, entry: IndexEntry) -> Result<()> {
        if let Some(latest) = self.latest() {
            if entry.version <= latest.version {
                return Err(DataverError::validation(format!(
                    "Cannot index {} after {}: version identifiers must increase",
                    entry.version, latest.version
                )));
            }
        }
        self.versions.push(entry);
        self.last_updated = Some(Utc::now());
        Ok(())
    }
}
