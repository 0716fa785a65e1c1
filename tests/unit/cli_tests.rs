//! Unit tests for CLI argument parsing and validation

use clap::Parser;
use dataver::cli::{Cli, Commands, OutputFormat};
use dataver::VersionId;
use std::path::PathBuf;

#[test]
fn test_cli_init_command() {
    let cli = Cli::try_parse_from(["dataver", "init"]).unwrap();
    match cli.command {
        Commands::Init { force } => assert!(!force),
        _ => panic!("Expected Init command"),
    }
}

#[test]
fn test_cli_init_command_with_force() {
    let cli = Cli::try_parse_from(["dataver", "init", "--force"]).unwrap();
    match cli.command {
        Commands::Init { force } => assert!(force),
        _ => panic!("Expected Init command"),
    }
}

#[test]
fn test_cli_create_command() {
    let cli = Cli::try_parse_from(["dataver", "create", "data/clean.csv"]).unwrap();
    match cli.command {
        Commands::Create {
            input,
            quality_score,
        } => {
            assert_eq!(input, PathBuf::from("data/clean.csv"));
            assert_eq!(quality_score, None);
        }
        _ => panic!("Expected Create command"),
    }
}

#[test]
fn test_cli_create_accepts_negative_score_for_validation() {
    let cli = Cli::try_parse_from(["dataver", "create", "a.csv", "--quality-score", "-3"]).unwrap();
    match cli.command {
        Commands::Create { quality_score, .. } => assert_eq!(quality_score, Some(-3.0)),
        _ => panic!("Expected Create command"),
    }
}

#[test]
fn test_cli_compare_command_defaults() {
    let cli = Cli::try_parse_from(["dataver", "compare", "v1", "v2"]).unwrap();
    match cli.command {
        Commands::Compare {
            from,
            to,
            output,
            format,
        } => {
            assert_eq!(from, VersionId::new(1));
            assert_eq!(to, VersionId::new(2));
            assert_eq!(output, None);
            assert_eq!(format, OutputFormat::Pretty);
        }
        _ => panic!("Expected Compare command"),
    }
}

#[test]
fn test_cli_compare_with_output() {
    let cli = Cli::try_parse_from([
        "dataver",
        "compare",
        "v3",
        "v12",
        "--output",
        "reports/v3_v12.json",
    ])
    .unwrap();
    match cli.command {
        Commands::Compare { output, .. } => {
            assert_eq!(output, Some(PathBuf::from("reports/v3_v12.json")));
        }
        _ => panic!("Expected Compare command"),
    }
}

#[test]
fn test_cli_rollback_command() {
    let cli = Cli::try_parse_from(["dataver", "rollback", "v1"]).unwrap();
    match cli.command {
        Commands::Rollback {
            to,
            force,
            no_backup,
            dry_run,
        } => {
            assert_eq!(to, VersionId::new(1));
            assert!(!force);
            assert!(!no_backup);
            assert!(!dry_run);
        }
        _ => panic!("Expected Rollback command"),
    }
}

#[test]
fn test_cli_rollback_dry_run() {
    let cli = Cli::try_parse_from(["dataver", "rollback", "v4", "--dry-run"]).unwrap();
    assert!(matches!(cli.command, Commands::Rollback { dry_run: true, .. }));
}

#[test]
fn test_cli_list_info_history() {
    let cli = Cli::try_parse_from(["dataver", "list", "--format", "json"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::List {
            format: OutputFormat::Json
        }
    ));

    let cli = Cli::try_parse_from(["dataver", "info", "v7"]).unwrap();
    match cli.command {
        Commands::Info { version, format } => {
            assert_eq!(version, VersionId::new(7));
            assert_eq!(format, OutputFormat::Pretty);
        }
        _ => panic!("Expected Info command"),
    }

    let cli = Cli::try_parse_from(["dataver", "history"]).unwrap();
    assert!(matches!(cli.command, Commands::History { .. }));
}

#[test]
fn test_cli_global_flags() {
    let cli = Cli::try_parse_from([
        "dataver",
        "--verbose",
        "--config",
        "custom.yaml",
        "list",
    ])
    .unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));

    let cli = Cli::try_parse_from(["dataver", "list", "--workspace", "/tmp/data"]).unwrap();
    assert_eq!(cli.workspace, Some(PathBuf::from("/tmp/data")));
}

#[test]
fn test_cli_invalid_arguments() {
    assert!(Cli::try_parse_from(["dataver"]).is_err());
    assert!(Cli::try_parse_from(["dataver", "unknown"]).is_err());
    assert!(Cli::try_parse_from(["dataver", "create"]).is_err());
    assert!(Cli::try_parse_from(["dataver", "compare", "v1"]).is_err());
    assert!(Cli::try_parse_from(["dataver", "compare", "v1", "latest"]).is_err());
    assert!(Cli::try_parse_from(["dataver", "rollback", "v-1"]).is_err());
    assert!(Cli::try_parse_from(["dataver", "create", "a.csv", "--quality-score", "high"]).is_err());
    assert!(Cli::try_parse_from(["dataver", "history", "--format", "xml"]).is_err());
}
