//! Core data structures.
//!
//! - Raw build settings and profiles
//! - The resolved target description
//! - Packaged artifacts and consumer info
//! - Recipe error kinds

pub mod artifact;
pub mod error;
pub mod package_info;
pub mod settings;
pub mod target;

pub use artifact::{ArtifactSet, LibraryKind};
pub use error::RecipeError;
pub use package_info::{PackageInfo, PackageManifest};
pub use settings::{BuildSettings, CompilerSettings, Profile};
pub use target::{BuildType, Compiler, Cpu, LinkMode, Os, TargetSpec, ToolchainFamily};
