//! Command-line interface for dataver

use crate::version::VersionId;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dataver")]
#[command(about = "Local versioning for CSV datasets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override workspace location
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Use a config file other than config/versioning_config.yaml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a dataver workspace
    Init {
        /// Overwrite an existing config with defaults
        #[arg(long)]
        force: bool,
    },

    /// Create a new version from a CSV file
    Create {
        /// Dataset file to version
        input: PathBuf,

        /// Quality score between 0 and 100
        #[arg(long, allow_negative_numbers = true)]
        quality_score: Option<f64>,
    },

    /// Compare two versions
    Compare {
        /// Baseline version (e.g. v1)
        from: VersionId,

        /// Version to compare against the baseline
        to: VersionId,

        /// Save the comparison report as JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Make an earlier version current
    Rollback {
        /// Version to roll back to
        to: VersionId,

        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,

        /// Do not annotate the current version before rolling back
        #[arg(long)]
        no_backup: bool,

        /// Check the rollback without changing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List all versions
    List {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Show metadata of a version
    Info {
        /// Version to display
        version: VersionId,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Show the rollback history
    History {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}
