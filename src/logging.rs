//! Logger setup: stderr plus an optional size-rotated log file
//!
//! The level comes from the `logging` config section, `--verbose` raises it to
//! debug, and `RUST_LOG` directives take precedence over both.

use crate::config::LoggingConfig;
use crate::error::Result;
use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use log::{LevelFilter, Log, Metadata, Record};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Install the global logger
pub fn init(config: &LoggingConfig, logs_dir: &Path, verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        config.level_filter()?
    };

    let console = builder(level, config.format.as_deref()).build();
    let file = match &config.file {
        Some(file_name) => {
            let sink = rotating_sink(
                &logs_dir.join(file_name),
                config.max_file_size_mb,
                config.backup_count,
            )?;
            let mut file_builder = builder(level, config.format.as_deref());
            file_builder
                .target(env_logger::Target::Pipe(Box::new(sink)))
                .write_style(env_logger::WriteStyle::Never);
            Some(file_builder.build())
        }
        None => None,
    };

    let max_level = file
        .as_ref()
        .map_or(console.filter(), |f| f.filter().max(console.filter()));
    log::set_boxed_logger(Box::new(DualLogger { console, file }))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    log::set_max_level(max_level);

    log::debug!("Logging initialized at level {}", level);
    Ok(())
}

fn builder(level: LevelFilter, format: Option<&str>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.parse_env(env_logger::Env::default());
    if let Some(pattern) = format {
        let pattern = pattern.to_string();
        builder.format(move |buf, record| writeln!(buf, "{}", render_record(&pattern, record)));
    }
    builder
}

/// Log file that moves to `name.1`, `name.2`, ... once it reaches the size
/// limit, keeping at most `backup_count` old files. A zero size or count
/// disables rotation.
pub fn rotating_sink(path: &Path, max_file_size_mb: u64, backup_count: u32) -> Result<FileRotate<AppendCount>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let max_bytes = max_file_size_mb.saturating_mul(1024 * 1024);
    let limit = if max_bytes == 0 || backup_count == 0 {
        ContentLimit::None
    } else {
        ContentLimit::Bytes(usize::try_from(max_bytes).unwrap_or(usize::MAX))
    };
    Ok(build_sink(path, backup_count as usize, limit))
}

fn build_sink(path: &Path, backup_count: usize, limit: ContentLimit) -> FileRotate<AppendCount> {
    FileRotate::new(
        path,
        AppendCount::new(backup_count),
        limit,
        Compression::None,
        #[cfg(unix)]
        None,
    )
}

/// Fill a `%(field)s` layout from a log record
pub fn render_record(pattern: &str, record: &Record) -> String {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f").to_string();
    pattern
        .replace("%(asctime)s", &timestamp)
        .replace("%(name)s", record.target())
        .replace("%(levelname)s", record.level().as_str())
        .replace("%(message)s", &record.args().to_string())
}

/// Sends each record to the console logger and, when configured, the file logger
struct DualLogger {
    console: env_logger::Logger,
    file: Option<env_logger::Logger>,
}

impl Log for DualLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console.enabled(metadata) || self.file.as_ref().map_or(false, |f| f.enabled(metadata))
    }

    fn log(&self, record: &Record) {
        self.console.log(record);
        if let Some(file) = &self.file {
            file.log(record);
        }
    }

    fn flush(&self) {
        self.console.flush();
        if let Some(file) = &self.file {
            file.flush();
        }
    }
}
