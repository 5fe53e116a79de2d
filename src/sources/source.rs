//! Source trait definition.

use std::path::Path;

use crate::core::RecipeError;

/// Somewhere a library source tree can be materialized from.
pub trait Source {
    /// Human-readable description, used in log lines.
    fn describe(&self) -> String;

    /// Place the source tree into `dest`.
    ///
    /// A failed fetch leaves `dest` in an unspecified state; callers must
    /// not build from it.
    fn fetch(&self, dest: &Path) -> Result<(), RecipeError>;
}
