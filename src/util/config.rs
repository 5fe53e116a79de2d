//! Configuration file support.
//!
//! Two locations are read:
//! - Global: `~/.botan-recipe/config.toml` - user-wide defaults
//! - Project: `.botan-recipe/config.toml` - overrides for the current directory
//!
//! Project config takes precedence over global config. Build settings are not
//! part of the config; they come from profiles (see `core::settings`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Upstream Botan repository.
pub const DEFAULT_REPOSITORY: &str = "https://github.com/randombit/botan.git";

/// Botan release this recipe packages.
pub const DEFAULT_VERSION: &str = "2.10.0";

/// Recipe configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the library source comes from
    pub source: SourceConfig,

    /// External tools
    pub tools: ToolsConfig,

    /// Output locations
    pub paths: PathsConfig,
}

/// Source settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Git URL to clone (defaults to upstream Botan)
    pub url: Option<String>,

    /// Tag to check out (defaults to the packaged release)
    pub version: Option<String>,
}

/// External tool overrides. Unset tools are looked up in PATH.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Interpreter used to run `configure.py`
    pub python: Option<PathBuf>,

    /// Make program for Unix-style toolchains
    pub make: Option<PathBuf>,

    /// Make program for Visual Studio
    pub nmake: Option<PathBuf>,

    /// Explicit `vcvarsall.bat`, bypassing vswhere
    pub vcvarsall: Option<PathBuf>,

    /// Parallel make jobs (None = available parallelism)
    pub jobs: Option<usize>,
}

/// Output locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root for per-settings working directories
    pub work_dir: Option<PathBuf>,

    /// Root for finished packages
    pub package_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.source.url.is_some() {
            self.source.url = other.source.url;
        }
        if other.source.version.is_some() {
            self.source.version = other.source.version;
        }

        if other.tools.python.is_some() {
            self.tools.python = other.tools.python;
        }
        if other.tools.make.is_some() {
            self.tools.make = other.tools.make;
        }
        if other.tools.nmake.is_some() {
            self.tools.nmake = other.tools.nmake;
        }
        if other.tools.vcvarsall.is_some() {
            self.tools.vcvarsall = other.tools.vcvarsall;
        }
        if other.tools.jobs.is_some() {
            self.tools.jobs = other.tools.jobs;
        }

        if other.paths.work_dir.is_some() {
            self.paths.work_dir = other.paths.work_dir;
        }
        if other.paths.package_dir.is_some() {
            self.paths.package_dir = other.paths.package_dir;
        }
    }

    /// Repository URL to fetch.
    pub fn repository_url(&self) -> &str {
        self.source.url.as_deref().unwrap_or(DEFAULT_REPOSITORY)
    }

    /// Library version (and git tag) to fetch.
    pub fn library_version(&self) -> &str {
        self.source.version.as_deref().unwrap_or(DEFAULT_VERSION)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.botan-recipe/config.toml)
/// 2. Global config (~/.botan-recipe/config.toml)
/// 3. Defaults
///
/// A missing file is skipped; a file that exists but does not parse is an
/// error.
pub fn load_config(global_path: &Path, project_path: &Path) -> Result<Config> {
    let mut config = Config::default();

    for path in [global_path, project_path] {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            config.merge(Config::load(path)?);
        }
    }

    Ok(config)
}
