//! botan-recipe - fetch, configure, build and package the Botan library
//!
//! This crate provides the recipe steps as a library: a source fetcher, the
//! settings translator, the configure and build drivers, and the package
//! assembler, plus the operations that chain them.

pub mod builder;
pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

pub use self::core::{
    ArtifactSet, BuildSettings, PackageInfo, PackageManifest, RecipeError, TargetSpec,
};

pub use util::context::GlobalContext;
