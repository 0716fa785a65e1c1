//! Output formatting utilities

use crate::compare::ComparisonReport;
use crate::error::Result;
use crate::index::IndexEntry;
use crate::metadata::VersionMetadata;
use crate::rollback::{RollbackRecord, SafetyCheck};
use crate::store::StoreStats;
use crate::version::VersionId;
use serde::Serialize;

/// Pretty printer for dataver output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print the version list, marking the current version
    pub fn print_version_list(versions: &[(VersionId, Option<VersionMetadata>)], current: Option<VersionId>) {
        if versions.is_empty() {
            println!("No versions found.");
            return;
        }

        println!("📦 Available Versions:");
        for (i, (version, metadata)) in versions.iter().enumerate() {
            let prefix = if i == versions.len() - 1 { "└─" } else { "├─" };
            println!(
                "{} {}",
                prefix,
                version_line(*version, metadata.as_ref(), Some(*version) == current)
            );
        }
    }

    /// Print store statistics
    pub fn print_store_stats(stats: &StoreStats) {
        println!("📊 Version Store");
        println!("├─ Versions: {}", stats.version_count);
        println!(
            "├─ Current: {}",
            stats.current.map_or_else(|| "none".to_string(), |v| v.to_string())
        );
        println!("└─ Size on disk: {}", format_bytes(stats.total_bytes));
    }

    /// Print the metadata of one version
    pub fn print_version_metadata(metadata: &VersionMetadata) {
        println!("📦 Version: {}", metadata.version);
        println!("├─ Created: {}", metadata.created_at.to_rfc3339());
        println!("├─ Source: {}", metadata.source_file);
        if let Some(rows) = metadata.row_count {
            println!("├─ Rows: {}", rows);
        }
        if let Some(count) = metadata.column_count {
            println!("├─ Columns: {}", count);
        }
        if let Some(size) = metadata.file_size_bytes {
            println!("├─ Size: {}", format_bytes(size));
        }
        if let Some(score) = metadata.quality_score {
            println!("├─ Quality score: {}", score);
        }
        if let Some(hash) = &metadata.file_hash {
            let algorithm = metadata
                .hash_algorithm
                .map(|a| a.to_string())
                .unwrap_or_else(|| "hash".to_string());
            println!("├─ {}: {}", algorithm, hash);
        }
        if !metadata.backups.is_empty() {
            println!("├─ Backups: {}", metadata.backups.len());
        }

        match &metadata.data_types {
            Some(types) if !types.is_empty() => {
                println!("└─ Column Types:");
                for (i, (name, column_type)) in types.iter().enumerate() {
                    let prefix = if i == types.len() - 1 { "   └─" } else { "   ├─" };
                    println!("{} {}: {}", prefix, name, column_type);
                }
            }
            _ => println!("└─ Columns: {}", metadata.column_names().join(", ")),
        }
    }

    /// Print a comparison report
    pub fn print_comparison(report: &ComparisonReport) {
        println!("🔍 Comparison: {} → {}", report.version1, report.version2);

        if let Some(rows) = &report.row_count_comparison {
            println!(
                "├─ Rows: {} → {} ({:+}, {:?}%, {})",
                rows.version1_row_count,
                rows.version2_row_count,
                rows.difference,
                rows.percentage_change,
                rows.direction
            );
        }

        if let Some(columns) = &report.column_comparison {
            println!(
                "├─ Columns: {} → {}",
                columns.version1_column_count, columns.version2_column_count
            );
            if !columns.added_columns.is_empty() {
                println!("│  ├─ Added: {}", columns.added_columns.join(", "));
            }
            if !columns.removed_columns.is_empty() {
                println!("│  ├─ Removed: {}", columns.removed_columns.join(", "));
            }
            println!("│  └─ Common: {}", columns.common_columns.len());
        }

        if let Some(types) = &report.data_type_comparison {
            if types.total_changes == 0 {
                println!("├─ ✅ Data types: unchanged");
            } else {
                println!("├─ ❌ Data types: {} changed", types.total_changes);
                for (name, change) in &types.changed_columns {
                    println!(
                        "│  └─ {}: {} → {}",
                        name, change.version1_type, change.version2_type
                    );
                }
            }
        }

        if let Some(samples) = &report.sample_data_comparison {
            println!(
                "├─ Sample rows: {} vs {} (limit {})",
                samples.version1_sample.len(),
                samples.version2_sample.len(),
                samples.sample_size
            );
        }

        println!("└─ Summary: {} difference(s)", report.summary.total_differences);
        for (i, change) in report.summary.key_changes.iter().enumerate() {
            let prefix = if i == report.summary.key_changes.len() - 1 {
                "   └─"
            } else {
                "   ├─"
            };
            println!("{} {}", prefix, change);
        }
    }

    /// Print the rollback audit trail
    pub fn print_rollback_history(records: &[RollbackRecord]) {
        if records.is_empty() {
            println!("No rollbacks recorded.");
            return;
        }

        println!("🔄 Rollback History:");
        for (i, record) in records.iter().enumerate() {
            let prefix = if i == records.len() - 1 { "└─" } else { "├─" };
            println!(
                "{} {}: {} → {}",
                prefix,
                record.timestamp.to_rfc3339(),
                record
                    .from_version
                    .map_or_else(|| "none".to_string(), |v| v.to_string()),
                record.to_version
            );
        }
    }

    /// Print the result of a rollback safety check
    pub fn print_safety_check(target: VersionId, current: Option<VersionId>, check: &SafetyCheck) {
        let marker = if check.safe { "✅" } else { "❌" };
        println!("🔍 Rollback check for {}", target);
        println!(
            "├─ Current: {}",
            current.map_or_else(|| "none".to_string(), |v| v.to_string())
        );
        println!("└─ {} {}", marker, check.reason);
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Format the version list with the current marker and store stats
    pub fn format_version_list(
        versions: &[VersionId],
        history: &[IndexEntry],
        stats: &StoreStats,
    ) -> Result<String> {
        let json = serde_json::json!({
            "current_version": stats.current,
            "versions": versions,
            "index": history,
            "version_count": stats.version_count,
            "total_bytes": stats.total_bytes,
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }
}

/// Format bytes in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// One list entry: creation time and row count, or a note when the
/// metadata could not be read
pub fn version_line(version: VersionId, metadata: Option<&VersionMetadata>, is_current: bool) -> String {
    let marker = if is_current { " (current)" } else { "" };
    match metadata {
        Some(m) => format!(
            "{}: {} ({} rows){}",
            version,
            m.created_at.to_rfc3339(),
            m.row_count.map_or_else(|| "N/A".to_string(), |n| n.to_string()),
            marker
        ),
        None => format!("{}: Error reading metadata{}", version, marker),
    }
}
