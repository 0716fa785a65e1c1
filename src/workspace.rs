//! Workspace discovery and bootstrap

use crate::config::{Config, StorageConfig, DEFAULT_CONFIG_PATH};
use crate::error::{DataverError, Result};
use crate::store::VersionStore;
use std::fs;
use std::path::{Path, PathBuf};

/// A directory tree managed by dataver
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Project root; relative storage paths resolve against it
    pub root: PathBuf,
    /// Location of the YAML config
    pub config_path: PathBuf,
    explicit_config: bool,
}

impl Workspace {
    /// Find the workspace containing `start_dir` (or the current directory),
    /// falling back to the start directory itself
    pub fn locate(start_dir: Option<&Path>, config_path: Option<&Path>) -> Result<Self> {
        let current_dir = std::env::current_dir()?;
        let start = start_dir.unwrap_or(&current_dir);

        let workspace = match Self::find_existing(start) {
            Some(workspace) => workspace,
            None => Self::from_root(start.to_path_buf()),
        };

        Ok(match config_path {
            Some(path) => workspace.with_config_path(path.to_path_buf()),
            None => workspace,
        })
    }

    /// Walk up the directory tree looking for a config file, stopping at a
    /// `.git` boundary
    fn find_existing(start_dir: &Path) -> Option<Self> {
        let mut current = start_dir;

        loop {
            if current.join(DEFAULT_CONFIG_PATH).is_file() {
                return Some(Self::from_root(current.to_path_buf()));
            }

            if current.join(".git").exists() {
                break;
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        None
    }

    pub fn from_root(root: PathBuf) -> Self {
        let config_path = root.join(DEFAULT_CONFIG_PATH);
        Self {
            root,
            config_path,
            explicit_config: false,
        }
    }

    /// Use a config file other than the default one
    pub fn with_config_path(mut self, config_path: PathBuf) -> Self {
        self.config_path = config_path;
        self.explicit_config = true;
        self
    }

    /// Load the config. An explicitly chosen file must exist; the default
    /// file may be absent.
    pub fn load_config(&self) -> Result<Config> {
        if self.explicit_config {
            Config::load(&self.config_path)
        } else {
            Config::load_or_default(&self.config_path)
        }
    }

    pub fn storage(&self, config: &Config) -> StorageConfig {
        config.storage.resolve(&self.root)
    }

    /// Open the version store described by `config`
    pub fn open_store(&self, config: &Config) -> Result<VersionStore> {
        VersionStore::new(self.storage(config), config.metadata.clone())
    }

    /// Write the config and create the storage directories. An existing
    /// config is kept unless `force` is set.
    pub fn init(&self, force: bool) -> Result<Config> {
        let config = if self.config_path.exists() && !force {
            log::info!("Keeping existing config at {}", self.config_path.display());
            self.load_config()?
        } else {
            let config = Config::default();
            config.save(&self.config_path)?;
            log::info!("Wrote default config to {}", self.config_path.display());
            config
        };

        let storage = self.storage(&config);
        for dir in [&storage.versions_dir, &storage.processed_data_dir, &storage.logs_dir] {
            fs::create_dir_all(dir)?;
        }

        self.ensure_gitignore(&config.storage)?;

        log::info!("Initialized dataver workspace at: {}", self.root.display());
        Ok(config)
    }

    /// Ensure .gitignore excludes the log directory
    pub fn ensure_gitignore(&self, storage: &StorageConfig) -> Result<()> {
        if storage.logs_dir.is_absolute() {
            return Ok(());
        }

        let logs = storage.logs_dir.to_str().ok_or_else(|| {
            DataverError::config(format!(
                "Log directory is not valid UTF-8: {}",
                storage.logs_dir.display()
            ))
        })?;
        let entry = format!("{}/", logs.trim_end_matches('/'));
        let block = format!("# dataver logs\n{}\n", entry);

        let gitignore_path = self.root.join(".gitignore");
        if gitignore_path.exists() {
            let content = fs::read_to_string(&gitignore_path)?;
            if !content.lines().any(|line| line.trim() == entry) {
                let new_content = if content.ends_with('\n') || content.is_empty() {
                    format!("{}{}", content, block)
                } else {
                    format!("{}\n{}", content, block)
                };
                fs::write(&gitignore_path, new_content)?;
                log::info!("Updated .gitignore with dataver entries");
            }
        } else {
            fs::write(&gitignore_path, block)?;
            log::info!("Created .gitignore with dataver entries");
        }

        Ok(())
    }
}
