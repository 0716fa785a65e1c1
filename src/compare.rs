//! Comparison of two stored versions

use crate::config::ComparisonConfig;
use crate::data::{ColumnType, CsvAnalyzer, SampleRow};
use crate::error::Result;
use crate::metadata::VersionMetadata;
use crate::persist;
use crate::store::VersionStore;
use crate::version::VersionId;
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full comparison of `version1` (the baseline) against `version2`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub comparison_timestamp: DateTime<Utc>,
    pub version1: VersionId,
    pub version2: VersionId,
    pub version1_created_at: DateTime<Utc>,
    pub version2_created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count_comparison: Option<RowCountComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_comparison: Option<ColumnComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type_comparison: Option<DataTypeComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_data_comparison: Option<SampleDataComparison>,
    pub summary: ComparisonSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "increase")]
    Increase,
    #[serde(rename = "decrease")]
    Decrease,
    #[serde(rename = "no change")]
    NoChange,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Increase => write!(f, "increase"),
            Direction::Decrease => write!(f, "decrease"),
            Direction::NoChange => write!(f, "no change"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowCountComparison {
    pub version1_row_count: u64,
    pub version2_row_count: u64,
    pub difference: i64,
    pub percentage_change: f64,
    pub direction: Direction,
}

impl RowCountComparison {
    pub fn new(version1_row_count: u64, version2_row_count: u64) -> Self {
        let difference = version2_row_count as i64 - version1_row_count as i64;
        let percentage_change = if version1_row_count > 0 {
            round2(difference as f64 / version1_row_count as f64 * 100.0)
        } else {
            0.0
        };
        let direction = match difference {
            d if d > 0 => Direction::Increase,
            d if d < 0 => Direction::Decrease,
            _ => Direction::NoChange,
        };

        Self {
            version1_row_count,
            version2_row_count,
            difference,
            percentage_change,
            direction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnComparison {
    pub version1_column_count: usize,
    pub version2_column_count: usize,
    pub added_columns: Vec<String>,
    pub removed_columns: Vec<String>,
    pub common_columns: Vec<String>,
    pub columns_added_count: usize,
    pub columns_removed_count: usize,
}

impl ColumnComparison {
    /// Columns are matched by exact name; position is ignored
    pub fn new(columns1: &[String], columns2: &[String]) -> Self {
        let set1: IndexSet<&String> = columns1.iter().collect();
        let set2: IndexSet<&String> = columns2.iter().collect();

        let added_columns: Vec<String> = set2
            .iter()
            .filter(|c| !set1.contains(*c))
            .map(|c| c.to_string())
            .collect();
        let removed_columns: Vec<String> = set1
            .iter()
            .filter(|c| !set2.contains(*c))
            .map(|c| c.to_string())
            .collect();
        let common_columns: Vec<String> = set1
            .iter()
            .filter(|c| set2.contains(*c))
            .map(|c| c.to_string())
            .collect();

        Self {
            version1_column_count: set1.len(),
            version2_column_count: set2.len(),
            columns_added_count: added_columns.len(),
            columns_removed_count: removed_columns.len(),
            added_columns,
            removed_columns,
            common_columns,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeChange {
    pub version1_type: ColumnType,
    pub version2_type: ColumnType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTypeComparison {
    pub changed_columns: IndexMap<String, TypeChange>,
    pub total_changes: usize,
}

impl DataTypeComparison {
    /// Only columns typed in both versions are considered
    pub fn new(
        types1: &IndexMap<String, ColumnType>,
        types2: &IndexMap<String, ColumnType>,
    ) -> Self {
        let changed_columns: IndexMap<String, TypeChange> = types1
            .iter()
            .filter_map(|(column, &version1_type)| {
                let &version2_type = types2.get(column)?;
                (version1_type != version2_type).then(|| {
                    (
                        column.clone(),
                        TypeChange {
                            version1_type,
                            version2_type,
                        },
                    )
                })
            })
            .collect();

        Self {
            total_changes: changed_columns.len(),
            changed_columns,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleDataComparison {
    pub version1_sample: Vec<SampleRow>,
    pub version2_sample: Vec<SampleRow>,
    pub sample_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub total_differences: usize,
    pub key_changes: Vec<String>,
}

impl ComparisonSummary {
    fn from_parts(
        rows: Option<&RowCountComparison>,
        columns: Option<&ColumnComparison>,
        types: Option<&DataTypeComparison>,
    ) -> Self {
        let mut key_changes = Vec::new();

        if let Some(rows) = rows.filter(|r| r.difference != 0) {
            key_changes.push(format!(
                "Row count changed by {} ({:?}%)",
                rows.difference, rows.percentage_change
            ));
        }
        if let Some(columns) = columns {
            if columns.columns_added_count > 0 {
                key_changes.push(format!("{} columns added", columns.columns_added_count));
            }
            if columns.columns_removed_count > 0 {
                key_changes.push(format!("{} columns removed", columns.columns_removed_count));
            }
        }
        if let Some(types) = types.filter(|t| t.total_changes > 0) {
            key_changes.push(format!("{} data types changed", types.total_changes));
        }

        let total_differences = key_changes.len();
        if total_differences == 0 {
            key_changes.push("No significant differences found".to_string());
        }

        Self {
            total_differences,
            key_changes,
        }
    }
}

/// Read-only comparator over a version store
pub struct VersionComparator<'a> {
    store: &'a VersionStore,
    config: ComparisonConfig,
}

impl<'a> VersionComparator<'a> {
    pub fn new(store: &'a VersionStore, config: ComparisonConfig) -> Self {
        Self { store, config }
    }

    pub fn compare(&self, version1: VersionId, version2: VersionId) -> Result<ComparisonReport> {
        log::info!("Comparing versions {} and {}", version1, version2);

        let metadata1 = self.store.get_version_metadata(version1)?;
        let metadata2 = self.store.get_version_metadata(version2)?;
        let dataset1 = self.store.get_version_dataset_path(version1)?;
        let dataset2 = self.store.get_version_dataset_path(version2)?;

        let row_count_comparison = self
            .config
            .compare_row_count
            .then(|| RowCountComparison::new(metadata1.rows(), metadata2.rows()));

        let column_comparison = self
            .config
            .compare_columns
            .then(|| ColumnComparison::new(metadata1.column_names(), metadata2.column_names()));

        let data_type_comparison = self
            .config
            .compare_data_types
            .then(|| compare_types(&metadata1, &metadata2));

        let sample_data_comparison = self.config.include_sample_data.then(|| SampleDataComparison {
            version1_sample: CsvAnalyzer::read_sample(&dataset1, self.config.sample_size),
            version2_sample: CsvAnalyzer::read_sample(&dataset2, self.config.sample_size),
            sample_size: self.config.sample_size,
        });

        let summary = ComparisonSummary::from_parts(
            row_count_comparison.as_ref(),
            column_comparison.as_ref(),
            data_type_comparison.as_ref(),
        );

        log::info!("Comparison complete for {} and {}", version1, version2);

        Ok(ComparisonReport {
            comparison_timestamp: Utc::now(),
            version1,
            version2,
            version1_created_at: metadata1.created_at,
            version2_created_at: metadata2.created_at,
            row_count_comparison,
            column_comparison,
            data_type_comparison,
            sample_data_comparison,
            summary,
        })
    }
}

/// Write a report as pretty JSON, creating parent directories
pub fn save_comparison(report: &ComparisonReport, path: &Path) -> Result<()> {
    persist::write_json(path, report)?;
    log::info!("Comparison report saved to {}", path.display());
    Ok(())
}

fn compare_types(metadata1: &VersionMetadata, metadata2: &VersionMetadata) -> DataTypeComparison {
    let empty = IndexMap::new();
    DataTypeComparison::new(
        metadata1.data_types.as_ref().unwrap_or(&empty),
        metadata2.data_types.as_ref().unwrap_or(&empty),
    )
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
