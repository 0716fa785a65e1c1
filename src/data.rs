//! CSV analysis and column type inference
//!
//! Analysis is lenient: a file that exists but cannot be read cleanly as CSV
//! produces empty results and a warning instead of an error, because a
//! version is still created from the raw copy.

use crate::error::{DataverError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{BufReader, Read};
use std::path::Path;

/// One sampled row, keyed by column name in header order
pub type SampleRow = IndexMap<String, String>;

/// Inferred type of a whole column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    String,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::String => "string",
        };
        f.write_str(name)
    }
}

/// Classification of a single raw value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Integer,
    Float,
    Boolean,
    String,
}

impl ValueKind {
    /// Classify a raw CSV value. The checks run in a fixed order, so "1" is an
    /// integer even though it is also a boolean token.
    pub fn classify(value: &str) -> Self {
        if value.trim().is_empty() {
            Self::Null
        } else if is_integer(value) {
            Self::Integer
        } else if is_float(value) {
            Self::Float
        } else if is_boolean(value) {
            Self::Boolean
        } else {
            Self::String
        }
    }
}

fn is_integer(value: &str) -> bool {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('+'))
        .unwrap_or(trimmed);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Any parseable number with a decimal point, so "2.0" is a float
fn is_float(value: &str) -> bool {
    value.trim().parse::<f64>().is_ok() && value.contains('.')
}

fn is_boolean(value: &str) -> bool {
    ["true", "false", "yes", "no", "1", "0"]
        .iter()
        .any(|token| value.eq_ignore_ascii_case(token))
}

/// Tracks which kinds of value a column has shown so far
#[derive(Debug, Default, Clone, Copy)]
struct KindSet {
    integer: bool,
    float: bool,
    boolean: bool,
}

impl KindSet {
    fn record(&mut self, kind: ValueKind) {
        match kind {
            ValueKind::Integer => self.integer = true,
            ValueKind::Float => self.float = true,
            ValueKind::Boolean => self.boolean = true,
            ValueKind::Null | ValueKind::String => {}
        }
    }

    /// float > integer > boolean > string
    fn resolve(&self) -> ColumnType {
        if self.float {
            ColumnType::Float
        } else if self.integer {
            ColumnType::Integer
        } else if self.boolean {
            ColumnType::Boolean
        } else {
            ColumnType::String
        }
    }
}

/// Infer a column type from a set of raw values
pub fn infer_type<'a, I>(values: I) -> ColumnType
where
    I: IntoIterator<Item = &'a str>,
{
    let mut kinds = KindSet::default();
    for value in values {
        kinds.record(ValueKind::classify(value));
    }
    kinds.resolve()
}

/// Count logical CSV lines, blank ones included. Line breaks inside quoted
/// fields do not end a line, and a missing final newline still ends one.
pub fn count_record_lines<R: Read>(reader: R) -> Result<u64> {
    let mut reader = BufReader::new(reader);
    let mut buffer = [0u8; 8192];
    let mut lines = 0u64;
    let mut in_quotes = false;
    let mut field_start = true;
    let mut after_quote = false;
    let mut last = None;

    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        for &byte in &buffer[..read] {
            last = Some(byte);
            if in_quotes {
                if byte == b'"' {
                    in_quotes = false;
                    after_quote = true;
                }
                continue;
            }
            match byte {
                // An opening quote, or the second half of an escaped `""`
                b'"' if field_start || after_quote => {
                    in_quotes = true;
                    field_start = false;
                    after_quote = false;
                }
                b'\n' => {
                    lines += 1;
                    field_start = true;
                    after_quote = false;
                }
                b',' => {
                    field_start = true;
                    after_quote = false;
                }
                _ => {
                    field_start = false;
                    after_quote = false;
                }
            }
        }
    }

    if matches!(last, Some(byte) if byte != b'\n') {
        lines += 1;
    }
    Ok(lines)
}

/// Basic shape of a CSV file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvAnalysis {
    /// Data rows, excluding the header
    pub row_count: u64,
    /// Header fields in file order
    pub columns: Vec<String>,
}

impl CsvAnalysis {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Reads CSV files for metadata extraction and sampling
#[derive(Debug, Clone)]
pub struct CsvAnalyzer {
    sample_rows: usize,
}

impl CsvAnalyzer {
    pub fn new(sample_rows: usize) -> Self {
        Self { sample_rows }
    }

    /// Whether a path looks like a CSV file
    pub fn is_csv(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false)
    }

    fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
        Ok(csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?)
    }

    fn ensure_exists(path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(DataverError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Count rows and read the header, failing on any read error
    pub fn try_analyze(&self, path: &Path) -> Result<CsvAnalysis> {
        let mut reader = Self::reader(path)?;
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        // The csv reader skips blank lines, so it only validates here
        for record in reader.records() {
            record?;
        }

        let lines = count_record_lines(std::fs::File::open(path)?)?;
        Ok(CsvAnalysis {
            row_count: lines.saturating_sub(1),
            columns,
        })
    }

    /// Count rows and read the header, degrading to an empty analysis on
    /// malformed content
    pub fn analyze(&self, path: &Path) -> Result<CsvAnalysis> {
        Self::ensure_exists(path)?;

        match self.try_analyze(path) {
            Ok(analysis) => {
                log::debug!(
                    "CSV analysis of {}: {} rows, {} columns",
                    path.display(),
                    analysis.row_count,
                    analysis.column_count()
                );
                Ok(analysis)
            }
            Err(e) => {
                log::warn!("Error analyzing CSV {}: {}", path.display(), e);
                Ok(CsvAnalysis::default())
            }
        }
    }

    /// Infer per-column types from the first sampled rows, failing on any
    /// read error
    pub fn try_infer_types(
        &self,
        path: &Path,
        columns: &[String],
    ) -> Result<IndexMap<String, ColumnType>> {
        let mut reader = Self::reader(path)?;
        let headers = reader.headers()?.clone();

        let mut kinds: IndexMap<&str, KindSet> =
            columns.iter().map(|c| (c.as_str(), KindSet::default())).collect();

        for record in reader.records().take(self.sample_rows) {
            let record = record?;
            for (name, value) in headers.iter().zip(record.iter()) {
                if let Some(set) = kinds.get_mut(name) {
                    set.record(ValueKind::classify(value));
                }
            }
        }

        Ok(kinds
            .into_iter()
            .map(|(name, set)| (name.to_string(), set.resolve()))
            .collect())
    }

    /// Infer per-column types; every column is `string` if the file cannot
    /// be read
    pub fn infer_types(&self, path: &Path, columns: &[String]) -> IndexMap<String, ColumnType> {
        match self.try_infer_types(path, columns) {
            Ok(types) => types,
            Err(e) => {
                log::warn!("Error inferring data types for {}: {}", path.display(), e);
                columns
                    .iter()
                    .map(|c| (c.clone(), ColumnType::String))
                    .collect()
            }
        }
    }

    /// Read up to `limit` rows as column-name keyed maps. Rows read before
    /// an error are kept.
    pub fn read_sample(path: &Path, limit: usize) -> Vec<SampleRow> {
        let mut sample = Vec::new();

        let mut reader = match Self::reader(path) {
            Ok(reader) => reader,
            Err(e) => {
                log::warn!("Error reading CSV sample from {}: {}", path.display(), e);
                return sample;
            }
        };
        let headers = match reader.headers() {
            Ok(headers) => headers.clone(),
            Err(e) => {
                log::warn!("Error reading CSV sample from {}: {}", path.display(), e);
                return sample;
            }
        };

        for record in reader.records().take(limit) {
            match record {
                Ok(record) => sample.push(
                    headers
                        .iter()
                        .zip(record.iter())
                        .map(|(name, value)| (name.to_string(), value.to_string()))
                        .collect(),
                ),
                Err(e) => {
                    log::warn!("Error reading CSV sample from {}: {}", path.display(), e);
                    break;
                }
            }
        }

        sample
    }
}
