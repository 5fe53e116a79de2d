//! Global context for recipe operations.
//!
//! Provides centralized access to configuration and default paths.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{load_config, Config};

/// Name of the per-user and per-project data directory.
pub const DATA_DIR_NAME: &str = ".botan-recipe";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global data (~/.botan-recipe/)
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext for the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Self::with_cwd(cwd)
    }

    /// Create a GlobalContext rooted at a specific directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let home = directories::BaseDirs::new()
            .map(|b| b.home_dir().join(DATA_DIR_NAME))
            .unwrap_or_else(|| cwd.join(DATA_DIR_NAME));

        Ok(GlobalContext { cwd, home })
    }

    /// Override the global data directory.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Global config file (~/.botan-recipe/config.toml).
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Project data directory (.botan-recipe/ under cwd).
    pub fn project_dir(&self) -> PathBuf {
        self.cwd.join(DATA_DIR_NAME)
    }

    /// Project config file (.botan-recipe/config.toml).
    pub fn project_config_path(&self) -> PathBuf {
        self.project_dir().join("config.toml")
    }

    /// Load the merged global and project configuration.
    pub fn load_config(&self) -> Result<Config> {
        load_config(&self.config_path(), &self.project_config_path())
    }

    /// Root for per-settings working directories.
    pub fn work_dir(&self, config: &Config) -> PathBuf {
        config
            .paths
            .work_dir
            .as_ref()
            .map(|p| self.resolve(p))
            .unwrap_or_else(|| self.project_dir().join("work"))
    }

    /// Root for finished packages.
    pub fn package_root(&self, config: &Config) -> PathBuf {
        config
            .paths
            .package_dir
            .as_ref()
            .map(|p| self.resolve(p))
            .unwrap_or_else(|| self.project_dir().join("package"))
    }

    /// Make a possibly relative path absolute against cwd.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}
