//! High-level operations.
//!
//! This module contains the implementation of botan-recipe commands.

pub mod recipe_build;
pub mod test_package;

pub use recipe_build::{args, build, info, source, BuildOptions, BuildResult, SourceSpec};
pub use test_package::{test_package, TestPackageOptions, TestPackageResult};
