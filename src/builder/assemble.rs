//! Stages a built source tree into a package directory.
//!
//! Layout of the result:
//!
//! ```text
//! <package>/
//!   licenses/license.txt
//!   include/botan/*.h
//!   lib/      static archives, import libraries, .so / .dylib
//!   bin/      .dll
//!   package_info.json
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use semver::Version;

use crate::core::artifact::{ArtifactSet, LibraryKind};
use crate::core::package_info::{PackageInfo, PackageManifest};
use crate::core::target::{LinkMode, TargetSpec};
use crate::core::RecipeError;
use crate::util::fs::{copy_file, copy_into, ensure_dir, find_files, relative_path};
use crate::util::hash::sha256_file;

/// Packaged library name.
pub const LIBRARY_NAME: &str = "botan";

const LICENSE_FILE: &str = "license.txt";
const HEADER_DIR: &str = "build/include";
const HEADER_PATTERN: &str = "*.h";

/// A staged package.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub artifacts: ArtifactSet,
    pub info: PackageInfo,
}

/// One binary pattern and where its matches go.
struct BinaryRule {
    pattern: &'static str,
    dest: &'static str,
    kind: LibraryKind,
}

fn binary_rules(link_mode: LinkMode) -> [BinaryRule; 5] {
    // A .lib next to a DLL is only its import stub
    let lib_kind = match link_mode {
        LinkMode::Shared => LibraryKind::Import,
        LinkMode::Static => LibraryKind::Static,
    };

    [
        BinaryRule { pattern: "*.lib", dest: "lib", kind: lib_kind },
        BinaryRule { pattern: "*.dll", dest: "bin", kind: LibraryKind::Shared },
        BinaryRule { pattern: "*.so*", dest: "lib", kind: LibraryKind::Shared },
        BinaryRule { pattern: "*.dylib*", dest: "lib", kind: LibraryKind::Shared },
        BinaryRule { pattern: "*.a", dest: "lib", kind: LibraryKind::Static },
    ]
}

/// Copy the build outputs of `source_dir` into `package_dir` and write the
/// package manifest.
pub fn assemble(
    source_dir: &Path,
    package_dir: &Path,
    target: &TargetSpec,
    version: &Version,
) -> Result<Assembly, RecipeError> {
    let io_error = |e: anyhow::Error| RecipeError::Assembly {
        reason: format!("{:#}", e),
        dir: source_dir.to_path_buf(),
    };

    ensure_dir(package_dir).map_err(io_error)?;

    let mut artifacts = ArtifactSet::default();

    // License
    let license = source_dir.join(LICENSE_FILE);
    if !license.is_file() {
        return Err(RecipeError::no_match(LICENSE_FILE, source_dir));
    }
    let staged = copy_into(&license, &package_dir.join("licenses")).map_err(io_error)?;
    artifacts.license_file = relative_path(package_dir, &staged);

    // Headers keep their layout below build/include
    let header_root = source_dir.join(HEADER_DIR);
    let headers = find_files(&header_root, HEADER_PATTERN).map_err(io_error)?;
    if headers.is_empty() {
        return Err(RecipeError::no_match(
            &format!("{}/**/{}", HEADER_DIR, HEADER_PATTERN),
            source_dir,
        ));
    }
    for header in &headers {
        let rel = PathBuf::from("include").join(relative_path(&header_root, header));
        copy_file(header, &package_dir.join(&rel)).map_err(io_error)?;
        artifacts.headers.insert(rel);
    }
    tracing::debug!("Staged {} headers", artifacts.headers.len());

    // Binaries are flattened into lib/ or bin/
    for rule in binary_rules(target.link_mode) {
        let matches = find_files(source_dir, rule.pattern).map_err(io_error)?;
        if matches.is_empty() {
            tracing::debug!("No files matching `{}`", rule.pattern);
            continue;
        }

        let dest_dir = package_dir.join(rule.dest);
        for file in matches {
            let staged = copy_into(&file, &dest_dir).map_err(io_error)?;
            tracing::debug!("Staged {} ({})", staged.display(), rule.kind);
            artifacts
                .libraries
                .entry(rule.kind)
                .or_default()
                .insert(relative_path(package_dir, &staged));
        }
    }

    if artifacts.library_count() == 0 {
        let patterns: Vec<&str> = binary_rules(target.link_mode)
            .iter()
            .map(|rule| rule.pattern)
            .collect();
        return Err(RecipeError::no_match(&patterns.join(", "), source_dir));
    }

    let info = PackageInfo::for_target(target, version);
    write_manifest(package_dir, target, version, &info, &artifacts).map_err(io_error)?;

    Ok(Assembly { artifacts, info })
}

fn write_manifest(
    package_dir: &Path,
    target: &TargetSpec,
    version: &Version,
    info: &PackageInfo,
    artifacts: &ArtifactSet,
) -> anyhow::Result<()> {
    let mut files = BTreeMap::new();
    for rel in artifacts.all_files() {
        let checksum = sha256_file(&package_dir.join(rel))?;
        // Forward slashes on every host
        let key = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.insert(key, checksum);
    }

    let manifest = PackageManifest {
        name: LIBRARY_NAME.to_string(),
        version: version.clone(),
        target: target.clone(),
        info: info.clone(),
        files,
    };
    manifest.save(package_dir)
}
