//! The version store: version directories, the index and the current marker
//!
//! Layout under the configured storage paths:
//!
//! ```text
//! <versions_dir>/v<N>/<original-name>.csv
//! <versions_dir>/v<N>/metadata.json
//! <index_file>
//! <current_version_file>
//! ```
//!
//! A new version is assembled in a hidden staging directory and published by
//! renaming it to `v<N>`. Only then are the index and marker updated. There is
//! no locking; a single operator is assumed.

use crate::config::{MetadataConfig, StorageConfig};
use crate::data::CsvAnalyzer;
use crate::error::{DataverError, Result};
use crate::index::{IndexEntry, VersionIndex};
use crate::metadata::{MetadataExtractor, VersionMetadata};
use crate::persist;
use crate::progress::ProgressReporter;
use crate::version::VersionId;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use walkdir::WalkDir;

/// File name of the per-version metadata record
pub const METADATA_FILE_NAME: &str = "metadata.json";

const STAGING_PREFIX: &str = ".staging-";

/// Owns the on-disk version state
pub struct VersionStore {
    storage: StorageConfig,
    extractor: MetadataExtractor,
}

impl VersionStore {
    /// Open a store over already-resolved storage paths, creating the
    /// versions and processed-data directories if needed
    pub fn new(storage: StorageConfig, metadata: MetadataConfig) -> Result<Self> {
        fs::create_dir_all(&storage.versions_dir)?;
        fs::create_dir_all(&storage.processed_data_dir)?;
        log::debug!("Version store opened at {}", storage.versions_dir.display());

        Ok(Self {
            storage,
            extractor: MetadataExtractor::new(metadata),
        })
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn version_dir(&self, version: VersionId) -> PathBuf {
        self.storage.versions_dir.join(version.to_string())
    }

    pub fn metadata_path(&self, version: VersionId) -> PathBuf {
        self.version_dir(version).join(METADATA_FILE_NAME)
    }

    /// Snapshot `input` as a new version and make it current
    pub fn create_version(&self, input: &Path, quality_score: Option<f64>) -> Result<VersionId> {
        self.create_version_with_progress(input, quality_score, &mut ProgressReporter::new_minimal())
    }

    /// Snapshot `input` as a new version, reporting each stage
    pub fn create_version_with_progress(
        &self,
        input: &Path,
        quality_score: Option<f64>,
        progress: &mut ProgressReporter,
    ) -> Result<VersionId> {
        if !input.is_file() {
            log::error!("Input file not found: {}", input.display());
            return Err(DataverError::InputNotFound {
                path: input.to_path_buf(),
            });
        }

        if let Some(score) = quality_score {
            if !(0.0..=100.0).contains(&score) {
                log::error!("Invalid quality score: {}", score);
                return Err(DataverError::validation(format!(
                    "Quality score must be between 0 and 100, got {}",
                    score
                )));
            }
        }

        let file_name = input.file_name().ok_or_else(|| {
            DataverError::invalid_input(format!("Input has no file name: {}", input.display()))
        })?;

        let mut index = VersionIndex::load_or_new(&self.storage.index_file)?;
        let version = self.next_version_id(&index)?;

        // Stage the copy and metadata out of sight of readers
        let staging_dir = self
            .storage
            .versions_dir
            .join(format!("{}{}", STAGING_PREFIX, Uuid::new_v4()));
        fs::create_dir_all(&staging_dir)?;

        let staged = self.stage_version(&staging_dir, file_name, version, input, quality_score, progress);
        let metadata = match staged {
            Ok(metadata) => metadata,
            Err(e) => {
                discard_staging(&staging_dir);
                return Err(e);
            }
        };

        progress.stage(&format!("Publishing {}...", version));
        let version_dir = self.version_dir(version);
        if version_dir.exists() {
            discard_staging(&staging_dir);
            return Err(DataverError::validation(format!(
                "Version directory already exists: {}",
                version_dir.display()
            )));
        }
        if let Err(e) = fs::rename(&staging_dir, &version_dir) {
            discard_staging(&staging_dir);
            return Err(e.into());
        }
        log::info!("Published {} at {}", version, version_dir.display());

        index.append(IndexEntry::from(&metadata))?;
        index.save(&self.storage.index_file)?;
        log::info!("Updated versions index with {}", version);

        self.set_current_version(version)?;

        progress.finish(&format!("Created {}", version));
        log::info!(
            "Version '{}' created successfully in {:.2?}",
            version,
            progress.elapsed()
        );
        Ok(version)
    }

    fn stage_version(
        &self,
        staging_dir: &Path,
        file_name: &std::ffi::OsStr,
        version: VersionId,
        input: &Path,
        quality_score: Option<f64>,
        progress: &mut ProgressReporter,
    ) -> Result<VersionMetadata> {
        progress.stage("Copying dataset...");
        let staged_dataset = staging_dir.join(file_name);
        fs::copy(input, &staged_dataset)?;
        log::debug!("Copied {} to {}", input.display(), staged_dataset.display());

        progress.stage("Analyzing and hashing dataset...");
        let metadata = self
            .extractor
            .extract(version, &staged_dataset, input, quality_score)?;
        metadata.save(&staging_dir.join(METADATA_FILE_NAME))?;
        log::debug!("Created metadata for {}", version);

        Ok(metadata)
    }

    /// One past the highest version seen on disk or in the index
    fn next_version_id(&self, index: &VersionIndex) -> Result<VersionId> {
        let on_disk = self.get_all_versions()?.last().copied();
        let indexed = index.latest().map(|entry| entry.version);

        match on_disk.max(indexed) {
            Some(highest) => highest.next().ok_or_else(|| {
                DataverError::validation(format!(
                    "Cannot create a version after {}: identifiers exhausted",
                    highest
                ))
            }),
            None => Ok(VersionId::FIRST),
        }
    }

    /// All `v<N>` directories, in numeric order
    pub fn get_all_versions(&self) -> Result<Vec<VersionId>> {
        let mut versions = Vec::new();

        if !self.storage.versions_dir.exists() {
            return Ok(versions);
        }

        for entry in fs::read_dir(&self.storage.versions_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(version) = entry.file_name().to_str().and_then(VersionId::from_dir_name) {
                versions.push(version);
            }
        }

        versions.sort();
        Ok(versions)
    }

    pub fn version_exists(&self, version: VersionId) -> bool {
        self.version_dir(version).is_dir()
    }

    /// The active version, or `None` if no version was ever made current
    pub fn get_current_version(&self) -> Result<Option<VersionId>> {
        let path = &self.storage.current_version_file;
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)?;
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        content.parse().map(Some)
    }

    /// Overwrite the current-version marker
    pub fn set_current_version(&self, version: VersionId) -> Result<()> {
        persist::write_text(&self.storage.current_version_file, &version.to_string())?;
        log::info!("Set current version to {}", version);
        Ok(())
    }

    pub fn get_version_metadata(&self, version: VersionId) -> Result<VersionMetadata> {
        if !self.version_exists(version) {
            log::error!("Version directory not found for {}", version);
            return Err(DataverError::VersionNotFound { version });
        }

        let path = self.metadata_path(version);
        if !path.exists() {
            log::error!("Metadata file not found for {}", version);
            return Err(DataverError::MetadataNotFound { version });
        }

        VersionMetadata::load(&path)
    }

    /// Rewrite the metadata record of an existing version
    pub fn save_version_metadata(&self, metadata: &VersionMetadata) -> Result<()> {
        if !self.version_exists(metadata.version) {
            return Err(DataverError::VersionNotFound {
                version: metadata.version,
            });
        }
        metadata.save(&self.metadata_path(metadata.version))
    }

    /// Path of the CSV file stored inside a version directory
    pub fn get_version_dataset_path(&self, version: VersionId) -> Result<PathBuf> {
        let version_dir = self.version_dir(version);
        if !version_dir.is_dir() {
            log::error!("Version directory not found: {}", version_dir.display());
            return Err(DataverError::VersionNotFound { version });
        }

        let mut candidates: Vec<PathBuf> = fs::read_dir(&version_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && CsvAnalyzer::is_csv(path))
            .collect();
        candidates.sort();

        candidates
            .into_iter()
            .next()
            .ok_or(DataverError::DatasetNotFound { path: version_dir })
    }

    /// Index entries in creation order, empty if nothing was indexed yet
    pub fn version_history(&self) -> Result<Vec<IndexEntry>> {
        if !self.storage.index_file.exists() {
            return Ok(Vec::new());
        }
        Ok(VersionIndex::load_or_new(&self.storage.index_file)?.versions)
    }

    /// Version count and bytes on disk
    pub fn stats(&self) -> Result<StoreStats> {
        let versions = self.get_all_versions()?;
        let mut total_bytes = 0u64;

        for version in &versions {
            for entry in WalkDir::new(self.version_dir(*version)) {
                let entry = entry?;
                if entry.file_type().is_file() {
                    total_bytes += entry.metadata()?.len();
                }
            }
        }

        Ok(StoreStats {
            version_count: versions.len(),
            total_bytes,
            current: self.get_current_version()?,
        })
    }
}

fn discard_staging(staging_dir: &Path) {
    if let Err(e) = fs::remove_dir_all(staging_dir) {
        log::warn!(
            "Failed to remove staging directory {}: {}",
            staging_dir.display(),
            e
        );
    }
}

/// Statistics about the version store
#[derive(Debug, Default)]
pub struct StoreStats {
    pub version_count: usize,
    pub total_bytes: u64,
    pub current: Option<VersionId>,
}
