//! YAML configuration for dataver
//!
//! Every section has defaults, so a partial file (or no file at all) yields a
//! usable configuration. Each component receives only its own section.

use crate::error::{DataverError, Result};
use crate::hash::HashAlgorithm;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Location of the config file relative to the workspace root
pub const DEFAULT_CONFIG_PATH: &str = "config/versioning_config.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub storage: StorageConfig,
    pub metadata: MetadataConfig,
    pub comparison: ComparisonConfig,
    pub version_management: VersionManagementConfig,
    pub logging: LoggingConfig,
}

/// Where versions, the index, the marker and logs live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub versions_dir: PathBuf,
    pub processed_data_dir: PathBuf,
    pub index_file: PathBuf,
    pub current_version_file: PathBuf,
    pub logs_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            versions_dir: PathBuf::from("data/versions"),
            processed_data_dir: PathBuf::from("data/processed"),
            index_file: PathBuf::from("data/versions_index.json"),
            current_version_file: PathBuf::from("data/current_version.txt"),
            logs_dir: PathBuf::from("logs"),
        }
    }
}

impl StorageConfig {
    /// Anchor relative paths at the workspace root
    pub fn resolve(&self, root: &Path) -> Self {
        let anchor = |p: &PathBuf| if p.is_absolute() { p.clone() } else { root.join(p) };
        Self {
            versions_dir: anchor(&self.versions_dir),
            processed_data_dir: anchor(&self.processed_data_dir),
            index_file: anchor(&self.index_file),
            current_version_file: anchor(&self.current_version_file),
            logs_dir: anchor(&self.logs_dir),
        }
    }
}

/// Which fields are recorded for each version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataConfig {
    pub include_row_count: bool,
    pub include_columns: bool,
    pub include_data_types: bool,
    pub include_file_hash: bool,
    pub include_file_size: bool,
    pub hash_algorithm: HashAlgorithm,
    pub type_inference_sample_rows: usize,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            include_row_count: true,
            include_columns: true,
            include_data_types: true,
            include_file_hash: true,
            include_file_size: true,
            hash_algorithm: HashAlgorithm::Sha256,
            type_inference_sample_rows: crate::TYPE_INFERENCE_SAMPLE_ROWS,
        }
    }
}

/// Which sub-comparisons appear in a comparison report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparisonConfig {
    pub compare_row_count: bool,
    pub compare_columns: bool,
    pub compare_data_types: bool,
    pub include_sample_data: bool,
    pub sample_size: usize,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            compare_row_count: true,
            compare_columns: true,
            compare_data_types: true,
            include_sample_data: true,
            sample_size: crate::DEFAULT_SAMPLE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersionManagementConfig {
    pub backup_before_rollback: bool,
}

impl Default for VersionManagementConfig {
    fn default() -> Self {
        Self {
            backup_before_rollback: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of error, warn(ing), info, debug, trace, critical, off; any case
    pub level: String,
    /// Log file name inside the logs directory; console only when absent
    pub file: Option<String>,
    /// Record layout using `%(asctime)s`, `%(name)s`, `%(levelname)s` and
    /// `%(message)s` placeholders; the built-in layout when absent
    pub format: Option<String>,
    #[serde(alias = "max_file_size")]
    pub max_file_size_mb: u64,
    pub backup_count: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("versioning.log".to_string()),
            format: None,
            max_file_size_mb: 10,
            backup_count: 5,
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        match self.level.to_ascii_lowercase().as_str() {
            "warning" => Ok(log::LevelFilter::Warn),
            "critical" | "fatal" => Ok(log::LevelFilter::Error),
            other => other.parse().map_err(|_| {
                DataverError::config(format!("Invalid logging level: '{}'", self.level))
            }),
        }
    }
}

impl Config {
    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DataverError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| match e {
            DataverError::Yaml(err) => DataverError::config(format!(
                "Error parsing {}: {}",
                path.display(),
                err
            )),
            other => other,
        })
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Write this configuration as YAML
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn validate(&self) -> Result<()> {
        self.logging.level_filter()?;
        if self.metadata.type_inference_sample_rows == 0 {
            return Err(DataverError::config(
                "metadata.type_inference_sample_rows must be greater than 0",
            ));
        }
        Ok(())
    }
}
