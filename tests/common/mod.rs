//! Common test utilities and helpers

use dataver::{Config, Result, VersionId, VersionStore, Workspace};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture manager for creating temporary test environments
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub workspace: Workspace,
}

impl TestFixture {
    /// Create a new test fixture with initialized workspace
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let workspace = Workspace::from_root(temp_dir.path().to_path_buf());
        workspace.init(false)?;

        Ok(Self {
            temp_dir,
            workspace,
        })
    }

    /// Create a new test fixture without initializing workspace
    pub fn new_empty() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let workspace = Workspace::from_root(temp_dir.path().to_path_buf());

        Ok(Self {
            temp_dir,
            workspace,
        })
    }

    /// Get the root path of the test fixture
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config(&self) -> Config {
        self.workspace.load_config().expect("Config should load")
    }

    /// Open the workspace's version store
    pub fn store(&self) -> VersionStore {
        self.workspace
            .open_store(&self.config())
            .expect("Store should open")
    }

    pub fn version_dir(&self, n: u64) -> PathBuf {
        self.store().version_dir(VersionId::new(n))
    }

    pub fn current_version(&self) -> Option<VersionId> {
        self.store()
            .get_current_version()
            .expect("Marker should be readable")
    }

    /// Create a test CSV file with sample data
    pub fn create_csv(&self, name: &str, data: &[Vec<&str>]) -> Result<PathBuf> {
        let path = self.root().join(name);
        let mut content = String::new();

        for row in data {
            content.push_str(&row.join(","));
            content.push('\n');
        }

        fs::write(&path, content)?;
        Ok(path)
    }

    /// Create a test CSV file with raw string content
    pub fn create_csv_raw(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.root().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Create a corrupted file for testing error handling
    pub fn create_corrupted_file(&self, name: &str) -> Result<PathBuf> {
        let path = self.root().join(name);
        fs::write(&path, b"id,name\n1,\xff\xfe\x00broken\n")?;
        Ok(path)
    }

    /// Create a large CSV file
    pub fn create_large_csv(&self, name: &str, rows: usize, cols: usize) -> Result<PathBuf> {
        let path = self.root().join(name);
        let mut content = String::new();

        for i in 0..cols {
            if i > 0 {
                content.push(',');
            }
            content.push_str(&format!("col_{}", i));
        }
        content.push('\n');

        for row in 0..rows {
            for col in 0..cols {
                if col > 0 {
                    content.push(',');
                }
                content.push_str(&format!("{}", row * cols + col));
            }
            content.push('\n');
        }

        fs::write(&path, content)?;
        Ok(path)
    }

    /// Assert that a version directory exists
    pub fn assert_version_exists(&self, n: u64) {
        assert!(
            self.version_dir(n).is_dir(),
            "Version 'v{}' should exist",
            n
        );
    }

    /// Assert that a version directory does not exist
    pub fn assert_version_not_exists(&self, n: u64) {
        assert!(
            !self.version_dir(n).exists(),
            "Version 'v{}' should not exist",
            n
        );
    }
}

/// Helper for running CLI commands in tests
pub struct CliTestRunner {
    fixture: TestFixture,
}

impl CliTestRunner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            fixture: TestFixture::new()?,
        })
    }

    /// Runner over a directory that has not been initialized
    pub fn new_empty() -> Result<Self> {
        Ok(Self {
            fixture: TestFixture::new_empty()?,
        })
    }

    pub fn fixture(&self) -> &TestFixture {
        &self.fixture
    }

    /// Run a dataver command and return the result
    pub fn run_command(&self, args: &[&str]) -> Result<()> {
        use clap::Parser;
        use dataver::cli::Cli;
        use dataver::commands::execute_command;

        let mut cmd_args = vec!["dataver"];
        cmd_args.extend(args);

        let cli = Cli::try_parse_from(cmd_args)
            .map_err(|e| dataver::DataverError::invalid_input(e.to_string()))?;

        // Default to the fixture root unless --workspace was given
        let workspace_path = cli.workspace.as_deref().or(Some(self.fixture.root()));
        execute_command(cli.command, workspace_path, cli.config.as_deref())
    }

    /// Run a command and expect it to succeed
    pub fn expect_success(&self, args: &[&str]) {
        self.run_command(args).expect("Command should succeed");
    }

    /// Run a command and expect it to fail
    pub fn expect_failure(&self, args: &[&str]) -> dataver::DataverError {
        self.run_command(args).expect_err("Command should fail")
    }

    /// Create a version from CSV rows through the CLI
    pub fn create_version(&self, name: &str, data: &[Vec<&str>]) -> PathBuf {
        let path = self.fixture.create_csv(name, data).unwrap();
        self.expect_success(&["create", path.to_str().unwrap()]);
        path
    }
}

/// Sample data generators for testing
pub mod sample_data {
    pub fn simple_csv_data() -> Vec<Vec<&'static str>> {
        vec![
            vec!["id", "name", "price"],
            vec!["1", "Apple", "1.50"],
            vec!["2", "Banana", "0.75"],
            vec!["3", "Cherry", "2.00"],
        ]
    }

    pub fn updated_csv_data() -> Vec<Vec<&'static str>> {
        vec![
            vec!["id", "name", "price"],
            vec!["1", "Apple", "1.60"],
            vec!["2", "Banana", "0.75"],
            vec!["4", "Date", "3.00"],
            vec!["5", "Elderberry", "4.25"],
            vec!["6", "Fig", "2.10"],
        ]
    }

    pub fn schema_changed_csv_data() -> Vec<Vec<&'static str>> {
        vec![
            vec!["id", "name", "category", "in_stock"],
            vec!["1", "Apple", "Fruit", "yes"],
            vec!["2", "Banana", "Fruit", "no"],
            vec!["3", "Cherry", "Fruit", "yes"],
        ]
    }

    pub fn typed_csv_data() -> Vec<Vec<&'static str>> {
        vec![
            vec!["id", "amount", "flag", "label", "score"],
            vec!["1", "2.0", "true", "x", "10"],
            vec!["2", "3", "False", "y", "20"],
            vec!["3", "", "yes", "12", "3.5"],
        ]
    }
}

/// Assertion helpers for test validation
pub mod assertions {
    use dataver::Result;
    use std::path::Path;

    /// Assert that a file exists and is not empty
    pub fn assert_file_exists_and_not_empty(path: &Path) {
        assert!(path.exists(), "File should exist: {}", path.display());
        let metadata = std::fs::metadata(path).expect("Should be able to read file metadata");
        assert!(metadata.len() > 0, "File should not be empty: {}", path.display());
    }

    /// Assert that a directory exists
    pub fn assert_dir_exists(path: &Path) {
        assert!(path.exists(), "Directory should exist: {}", path.display());
        assert!(path.is_dir(), "Path should be a directory: {}", path.display());
    }

    /// Assert that a JSON file contains expected keys
    pub fn assert_json_contains_keys(path: &Path, keys: &[&str]) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let json: serde_json::Value = serde_json::from_str(&content)?;

        for key in keys {
            assert!(
                json.get(key).is_some(),
                "JSON should contain key '{}': {}",
                key,
                path.display()
            );
        }

        Ok(())
    }

    /// Assert that two files have the same content
    pub fn assert_files_equal(path1: &Path, path2: &Path) -> Result<()> {
        let content1 = std::fs::read(path1)?;
        let content2 = std::fs::read(path2)?;
        assert_eq!(content1, content2, "Files should have identical content");
        Ok(())
    }
}
