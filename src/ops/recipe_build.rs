//! Implementation of `botan-recipe build`, `source`, `args` and `info`.
//!
//! The pipeline is strictly linear: fetch, translate, configure, build,
//! assemble. The first failing step aborts the run.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use semver::Version;

use crate::builder::{self, translate::ConfigParameter};
use crate::core::package_info::MANIFEST_FILE;
use crate::core::{ArtifactSet, BuildSettings, PackageInfo, TargetSpec};
use crate::sources::{GitSource, PathSource, Source};
use crate::util::config::ToolsConfig;
use crate::util::fs::{ensure_dir, is_empty_dir, remove_dir_all_if_exists};

/// Where the library source comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// Clone `url` and check out `tag`
    Git { url: String, tag: String },

    /// Copy an existing tree
    Path(PathBuf),
}

impl SourceSpec {
    fn to_source(&self) -> Box<dyn Source> {
        match self {
            SourceSpec::Git { url, tag } => Box::new(GitSource::new(url.clone(), tag.clone())),
            SourceSpec::Path(path) => Box::new(PathSource::new(path.clone())),
        }
    }
}

/// Options for the build command.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Library source
    pub source: SourceSpec,

    /// Library version being packaged
    pub version: String,

    /// Root for per-settings working directories
    pub work_dir: PathBuf,

    /// Root for finished packages (one subdirectory per settings combination)
    pub package_root: PathBuf,

    /// Exact package directory, overriding `package_root`
    pub package_dir: Option<PathBuf>,

    /// Tool locations and job count
    pub tools: ToolsConfig,
}

/// Build result.
#[derive(Debug)]
pub struct BuildResult {
    /// Resolved settings
    pub target: TargetSpec,

    /// Arguments the configure script was run with
    pub params: Vec<ConfigParameter>,

    /// Staged package
    pub package_dir: PathBuf,

    /// Files in the package
    pub artifacts: ArtifactSet,

    /// Consumer info
    pub info: PackageInfo,
}

/// Parse the library version, which doubles as the git tag.
pub fn parse_version(version: &str) -> Result<Version> {
    Version::parse(version)
        .with_context(|| format!("library version `{}` is not a semantic version", version))
}

/// Directory a settings combination builds in, below `work_dir`.
pub fn build_root(work_dir: &Path, target: &TargetSpec, version: &str) -> PathBuf {
    work_dir.join(target.fingerprint(version))
}

/// Refuse a user-chosen package directory unless it is safe to wipe.
///
/// Only a missing or empty directory, or one holding a previous package,
/// may be replaced. The working directory must not live inside it.
fn check_package_dir(package_dir: &Path, build_root: &Path) -> Result<()> {
    if build_root.starts_with(package_dir) {
        bail!(
            "package directory `{}` contains the working directory `{}`",
            package_dir.display(),
            build_root.display()
        );
    }
    if !is_empty_dir(package_dir) && !package_dir.join(MANIFEST_FILE).is_file() {
        bail!(
            "package directory `{}` is not empty and holds no {}; refusing to overwrite it",
            package_dir.display(),
            MANIFEST_FILE
        );
    }
    Ok(())
}

/// Run the whole recipe for one settings combination.
pub fn build(settings: &BuildSettings, opts: &BuildOptions) -> Result<BuildResult> {
    let target = TargetSpec::resolve(settings)?;
    let version = parse_version(&opts.version)?;

    let root = build_root(&opts.work_dir, &target, &opts.version);
    let source_dir = root.join("source");
    let package_dir = opts
        .package_dir
        .clone()
        .unwrap_or_else(|| opts.package_root.join(target.fingerprint(&opts.version)));

    tracing::info!("Recipe for botan {} ({})", version, target);
    tracing::debug!("Working directory: {}", root.display());

    if opts.package_dir.is_some() {
        check_package_dir(&package_dir, &root)?;
    }

    // Every run starts from a clean tree
    remove_dir_all_if_exists(&root)?;
    ensure_dir(&root)?;

    let source = opts.source.to_source();
    tracing::info!("Fetching {}", source.describe());
    source
        .fetch(&source_dir)
        .with_context(|| format!("failed to fetch {}", source.describe()))?;

    let params = builder::translate_target(&target)?;
    tracing::info!(
        "Configure arguments: {}",
        builder::translate::to_args(&params).join(" ")
    );

    builder::configure(&source_dir, &params, &opts.tools)?;
    builder::build(&source_dir, &target, &opts.tools)?;

    remove_dir_all_if_exists(&package_dir)?;
    let assembly = builder::assemble(&source_dir, &package_dir, &target, &version)?;

    tracing::info!(
        "Packaged {} headers and {} libraries into {}",
        assembly.artifacts.headers.len(),
        assembly.artifacts.library_count(),
        package_dir.display()
    );

    Ok(BuildResult {
        target,
        params,
        package_dir,
        artifacts: assembly.artifacts,
        info: assembly.info,
    })
}

/// Fetch the library source into `dest` without building it.
pub fn source(spec: &SourceSpec, dest: &Path) -> Result<()> {
    if dest.exists() && !is_empty_dir(dest) {
        bail!("destination `{}` is not empty", dest.display());
    }

    let source = spec.to_source();
    source
        .fetch(dest)
        .with_context(|| format!("failed to fetch {}", source.describe()))?;
    Ok(())
}

/// Configure arguments for a settings combination.
pub fn args(settings: &BuildSettings) -> Result<Vec<ConfigParameter>> {
    Ok(builder::translate(settings)?)
}

/// Consumer info for a settings combination, without building.
pub fn info(settings: &BuildSettings, version: &str) -> Result<PackageInfo> {
    let target = TargetSpec::resolve(settings)?;
    let version = parse_version(version)?;
    Ok(PackageInfo::for_target(&target, &version))
}
