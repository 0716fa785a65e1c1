//! Command implementations for dataver CLI

use crate::cli::{Commands, OutputFormat};
use crate::compare::{save_comparison, VersionComparator};
use crate::config::Config;
use crate::error::Result;
use crate::output::{JsonFormatter, PrettyPrinter};
use crate::progress::ProgressReporter;
use crate::rollback::{RollbackHistory, RollbackManager};
use crate::store::VersionStore;
use crate::version::VersionId;
use crate::workspace::Workspace;
use std::io::BufRead;
use std::path::Path;

/// Execute a command
pub fn execute_command(
    command: Commands,
    workspace_path: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<()> {
    match command {
        Commands::Init { force } => init_command(workspace_path, config_path, force),
        Commands::Create {
            input,
            quality_score,
        } => create_command(workspace_path, config_path, &input, quality_score),
        Commands::Compare {
            from,
            to,
            output,
            format,
        } => compare_command(workspace_path, config_path, from, to, output.as_deref(), format),
        Commands::Rollback {
            to,
            force,
            no_backup,
            dry_run,
        } => rollback_command(workspace_path, config_path, to, force, !no_backup, dry_run),
        Commands::List { format } => list_command(workspace_path, config_path, format),
        Commands::Info { version, format } => {
            info_command(workspace_path, config_path, version, format)
        }
        Commands::History { format } => history_command(workspace_path, config_path, format),
    }
}

/// Locate the workspace and load its config
pub fn open_workspace(
    workspace_path: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<(Workspace, Config)> {
    let workspace = Workspace::locate(workspace_path, config_path)?;
    let config = workspace.load_config()?;
    log::debug!(
        "Using workspace {} with config {}",
        workspace.root.display(),
        workspace.config_path.display()
    );
    Ok((workspace, config))
}

fn open_store(
    workspace_path: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<(Workspace, Config, VersionStore)> {
    let (workspace, config) = open_workspace(workspace_path, config_path)?;
    let store = workspace.open_store(&config)?;
    Ok((workspace, config, store))
}

/// Initialize dataver workspace
fn init_command(workspace_path: Option<&Path>, config_path: Option<&Path>, force: bool) -> Result<()> {
    let current_dir = std::env::current_dir()?;
    let root = workspace_path.unwrap_or(&current_dir);

    // Always initialize in the given directory, never in a parent workspace
    let mut workspace = Workspace::from_root(root.to_path_buf());
    if let Some(path) = config_path {
        workspace = workspace.with_config_path(path.to_path_buf());
    }

    let config = workspace.init(force)?;
    let storage = workspace.storage(&config);

    println!("✅ Initialized dataver workspace at: {}", workspace.root.display());
    println!("├─ Config: {}", workspace.config_path.display());
    println!("├─ Versions: {}", storage.versions_dir.display());
    println!("└─ Logs: {}", storage.logs_dir.display());

    Ok(())
}

/// Create a new version
fn create_command(
    workspace_path: Option<&Path>,
    config_path: Option<&Path>,
    input: &Path,
    quality_score: Option<f64>,
) -> Result<()> {
    let (workspace, _config, store) = open_store(workspace_path, config_path)?;

    let input_path = if input.is_absolute() {
        input.to_path_buf()
    } else {
        // Resolve relative paths relative to the workspace root
        workspace.root.join(input)
    };

    println!("📦 Creating version from '{}'...", input.display());

    let mut progress = ProgressReporter::new_for_create();
    let version = store.create_version_with_progress(&input_path, quality_score, &mut progress)?;
    drop(progress);

    let metadata = store.get_version_metadata(version)?;

    println!("✅ Version created successfully!");
    println!("├─ Version: {}", metadata.version);
    println!("├─ Created: {}", metadata.created_at.to_rfc3339());
    if let Some(rows) = metadata.row_count {
        println!("├─ Rows: {}", rows);
    }
    if let Some(columns) = metadata.column_count {
        println!("├─ Columns: {}", columns);
    }
    println!("└─ Location: {}", store.version_dir(version).display());

    Ok(())
}

/// Compare two versions
fn compare_command(
    workspace_path: Option<&Path>,
    config_path: Option<&Path>,
    from: VersionId,
    to: VersionId,
    output_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let (_workspace, config, store) = open_store(workspace_path, config_path)?;

    let comparator = VersionComparator::new(&store, config.comparison.clone());
    let report = comparator.compare(from, to)?;

    match format {
        OutputFormat::Pretty => PrettyPrinter::print_comparison(&report),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&report)?),
    }

    if let Some(path) = output_path {
        save_comparison(&report, path)?;
        if format == OutputFormat::Pretty {
            println!("\n💾 Report saved to: {}", path.display());
        }
    }

    Ok(())
}

/// Roll the current-version marker back to an earlier version
fn rollback_command(
    workspace_path: Option<&Path>,
    config_path: Option<&Path>,
    to: VersionId,
    force: bool,
    backup: bool,
    dry_run: bool,
) -> Result<()> {
    let (_workspace, config, store) = open_store(workspace_path, config_path)?;
    let manager = RollbackManager::new(&store, config.version_management.clone());
    let current = store.get_current_version()?;

    if dry_run {
        let check = manager.is_safe(to)?;
        println!("🔍 Dry run - nothing will be changed:");
        PrettyPrinter::print_safety_check(to, current, &check);
        if check.safe {
            println!("\n💡 Would roll back {} → {}", display_current(current), to);
            if backup && config.version_management.backup_before_rollback && current.is_some() {
                println!("💡 {} would be annotated with a pre-rollback backup", display_current(current));
            }
        }
        return Ok(());
    }

    manager.ensure_safe(to)?;

    println!("🔄 Rollback: {} → {}", display_current(current), to);

    if !force {
        println!("⚠️  This will change the current version. Continue? (y/N)");
        if !confirm(std::io::stdin().lock())? {
            println!("❌ Rollback cancelled.");
            return Ok(());
        }
    }

    manager.rollback(to, backup)?;

    println!("✅ Rollback completed successfully!");
    println!("└─ Current version: {}", to);

    Ok(())
}

/// Read one line and accept only "y" or "yes"
fn confirm<R: BufRead>(mut reader: R) -> Result<bool> {
    let mut answer = String::new();
    reader.read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn display_current(current: Option<VersionId>) -> String {
    current.map_or_else(|| "none".to_string(), |v| v.to_string())
}

/// List all versions
fn list_command(
    workspace_path: Option<&Path>,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let (_workspace, _config, store) = open_store(workspace_path, config_path)?;

    let versions = store.get_all_versions()?;
    let stats = store.stats()?;

    match format {
        OutputFormat::Pretty => {
            let entries: Vec<_> = versions
                .iter()
                .map(|&version| {
                    let metadata = store
                        .get_version_metadata(version)
                        .map_err(|e| log::warn!("Cannot read metadata of {}: {}", version, e))
                        .ok();
                    (version, metadata)
                })
                .collect();
            PrettyPrinter::print_version_list(&entries, stats.current);
            if !versions.is_empty() {
                println!();
                PrettyPrinter::print_store_stats(&stats);
            }
        }
        OutputFormat::Json => {
            let history = store.version_history()?;
            println!(
                "{}",
                JsonFormatter::format_version_list(&versions, &history, &stats)?
            );
        }
    }

    Ok(())
}

/// Show version information
fn info_command(
    workspace_path: Option<&Path>,
    config_path: Option<&Path>,
    version: VersionId,
    format: OutputFormat,
) -> Result<()> {
    let (_workspace, _config, store) = open_store(workspace_path, config_path)?;
    let metadata = store.get_version_metadata(version)?;

    match format {
        OutputFormat::Pretty => PrettyPrinter::print_version_metadata(&metadata),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&metadata)?),
    }

    Ok(())
}

/// Show the rollback history
fn history_command(
    workspace_path: Option<&Path>,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let (_workspace, config, store) = open_store(workspace_path, config_path)?;
    let manager = RollbackManager::new(&store, config.version_management.clone());
    let rollbacks = manager.get_rollback_history();

    match format {
        OutputFormat::Pretty => PrettyPrinter::print_rollback_history(&rollbacks),
        OutputFormat::Json => {
            println!("{}", JsonFormatter::format(&RollbackHistory { rollbacks })?)
        }
    }

    Ok(())
}
