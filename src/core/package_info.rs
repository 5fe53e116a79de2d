//! What a consumer needs to link against the packaged library.
//!
//! `PackageInfo` depends only on the resolved settings and the library
//! version, never on the build output. The `BOTAN_DLL` define has to agree
//! with the link mode the tree was configured with: Botan's headers use it to
//! pick between dllimport/visibility attributes and plain declarations.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::target::{LinkMode, TargetSpec, ToolchainFamily};

/// Name of the manifest written at the package root.
pub const MANIFEST_FILE: &str = "package_info.json";

/// Link libraries and preprocessor defines for consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Libraries to link, in link order
    pub libs: Vec<String>,

    /// Preprocessor defines, as `NAME=value`
    pub defines: Vec<String>,
}

impl PackageInfo {
    /// Derive the consumer info for a target and library version.
    pub fn for_target(target: &TargetSpec, version: &Version) -> Self {
        let libs = match target.family() {
            ToolchainFamily::Msvc => vec![
                "botan".to_string(),
                "user32".to_string(),
                "ws2_32".to_string(),
            ],
            ToolchainFamily::Unix => {
                let mut libs = vec![
                    format!("botan-{}", version.major),
                    "dl".to_string(),
                    "rt".to_string(),
                ];
                if target.link_mode == LinkMode::Static {
                    libs.push("pthread".to_string());
                }
                libs
            }
        };

        let defines = vec![dll_define(target.link_mode).to_string()];

        PackageInfo { libs, defines }
    }
}

/// The `BOTAN_DLL` define for a link mode.
pub fn dll_define(link_mode: LinkMode) -> &'static str {
    match link_mode {
        LinkMode::Shared => "BOTAN_DLL=1",
        LinkMode::Static => "BOTAN_DLL=",
    }
}

/// Contents of `package_info.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Packaged library name
    pub name: String,

    /// Packaged library version
    pub version: Version,

    /// Settings the package was built with
    pub target: TargetSpec,

    /// Consumer info
    #[serde(flatten)]
    pub info: PackageInfo,

    /// SHA256 of every packaged file, keyed by path relative to the package root
    pub files: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Read `package_info.json` from a package directory.
    pub fn load(package_dir: &Path) -> Result<Self> {
        let path = package_dir.join(MANIFEST_FILE);
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read package manifest: {}", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse package manifest: {}", path.display()))
    }

    /// Write `package_info.json` into a package directory.
    pub fn save(&self, package_dir: &Path) -> Result<()> {
        let contents =
            serde_json::to_string_pretty(self).context("failed to serialize package manifest")?;
        crate::util::fs::write_string(&package_dir.join(MANIFEST_FILE), &contents)
    }
}
