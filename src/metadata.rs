//! Version metadata records and their extraction

use crate::config::MetadataConfig;
use crate::data::{ColumnType, CsvAnalyzer};
use crate::error::Result;
use crate::hash::{FileHasher, HashAlgorithm};
use crate::persist;
use crate::version::VersionId;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata stored as `metadata.json` inside each version directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionMetadata {
    pub version: VersionId,
    pub created_at: DateTime<Utc>,
    pub source_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_types: Option<IndexMap<String, ColumnType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_algorithm: Option<HashAlgorithm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backups: Vec<BackupNote>,
}

/// Annotation left on a version when the current pointer moves away from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupNote {
    pub backup_timestamp: DateTime<Utc>,
    pub backed_up_version: VersionId,
    pub reason: String,
}

impl BackupNote {
    pub fn pre_rollback(version: VersionId) -> Self {
        Self {
            backup_timestamp: Utc::now(),
            backed_up_version: version,
            reason: "Pre-rollback backup".to_string(),
        }
    }
}

impl VersionMetadata {
    /// Row count, treating an unrecorded count as zero
    pub fn rows(&self) -> u64 {
        self.row_count.unwrap_or(0)
    }

    /// Column names, empty when not recorded
    pub fn column_names(&self) -> &[String] {
        self.columns.as_deref().unwrap_or(&[])
    }

    pub fn load(path: &Path) -> Result<Self> {
        persist::read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        persist::write_json(path, self)
    }
}

/// Builds metadata for a dataset file according to the metadata config
pub struct MetadataExtractor {
    config: MetadataConfig,
    analyzer: CsvAnalyzer,
    hasher: FileHasher,
}

impl MetadataExtractor {
    pub fn new(config: MetadataConfig) -> Self {
        let analyzer = CsvAnalyzer::new(config.type_inference_sample_rows);
        let hasher = FileHasher::new(config.hash_algorithm);
        Self {
            config,
            analyzer,
            hasher,
        }
    }

    /// Extract metadata for `dataset_path`, which is the versioned copy of
    /// `source_file`
    pub fn extract(
        &self,
        version: VersionId,
        dataset_path: &Path,
        source_file: &Path,
        quality_score: Option<f64>,
    ) -> Result<VersionMetadata> {
        let mut metadata = VersionMetadata {
            version,
            created_at: Utc::now(),
            source_file: source_file.to_string_lossy().to_string(),
            row_count: None,
            columns: None,
            column_count: None,
            data_types: None,
            file_hash: None,
            hash_algorithm: None,
            file_size_bytes: None,
            quality_score,
            backups: Vec::new(),
        };

        if CsvAnalyzer::is_csv(dataset_path) {
            let analysis = self.analyzer.analyze(dataset_path)?;

            if self.config.include_row_count {
                metadata.row_count = Some(analysis.row_count);
            }
            if self.config.include_columns {
                metadata.column_count = Some(analysis.column_count());
                metadata.columns = Some(analysis.columns.clone());
            }
            if self.config.include_data_types {
                metadata.data_types =
                    Some(self.analyzer.infer_types(dataset_path, &analysis.columns));
            }
        } else {
            log::warn!(
                "{} is not a CSV file; skipping row, column and type analysis",
                dataset_path.display()
            );
        }

        if self.config.include_file_hash {
            metadata.file_hash = Some(self.hasher.hash_file(dataset_path)?);
            metadata.hash_algorithm = Some(self.hasher.algorithm());
        }

        if self.config.include_file_size {
            metadata.file_size_bytes = Some(std::fs::metadata(dataset_path)?.len());
        }

        Ok(metadata)
    }
}
