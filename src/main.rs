//! Main entry point for dataver CLI

use clap::Parser;
use dataver::cli::Cli;
use dataver::commands::{execute_command, open_workspace};
use dataver::config::LoggingConfig;
use dataver::logging;

fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging from the workspace config; a broken config is
    // reported by the command itself
    let (logging_config, logs_dir) =
        match open_workspace(cli.workspace.as_deref(), cli.config.as_deref()) {
            Ok((workspace, config)) => {
                let logs_dir = workspace.storage(&config).logs_dir;
                (config.logging, logs_dir)
            }
            Err(_) => (
                LoggingConfig {
                    file: None,
                    ..LoggingConfig::default()
                },
                std::path::PathBuf::new(),
            ),
        };

    if let Err(e) = logging::init(&logging_config, &logs_dir, cli.verbose) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Execute the command
    if let Err(e) = execute_command(cli.command, cli.workspace.as_deref(), cli.config.as_deref()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
