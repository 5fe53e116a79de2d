//! Path source - an existing source tree on disk.
//!
//! The tree is copied rather than built in place, so the configure step
//! never writes into the user's checkout.

use std::path::{Path, PathBuf};

use crate::core::RecipeError;
use crate::sources::Source;
use crate::util::fs::copy_dir_all;

/// A local source tree.
pub struct PathSource {
    path: PathBuf,
}

impl PathSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PathSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for PathSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self, dest: &Path) -> Result<(), RecipeError> {
        let error = |reason: String| RecipeError::Fetch {
            url: self.path.display().to_string(),
            tag: "local".to_string(),
            reason,
        };

        if !self.path.is_dir() {
            return Err(error("source directory does not exist".to_string()));
        }

        tracing::info!("Copying source tree from {}", self.path.display());

        copy_dir_all(&self.path, dest).map_err(|e| error(format!("{:#}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_local_tree() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("botan");
        std::fs::create_dir_all(src.join("src")).unwrap();
        std::fs::write(src.join("configure.py"), "").unwrap();
        std::fs::write(src.join("license.txt"), "BSD-2-Clause").unwrap();

        let dest = tmp.path().join("work/source");
        PathSource::new(&src).fetch(&dest).unwrap();

        assert!(dest.join("configure.py").exists());
        assert!(dest.join("src").is_dir());
    }

    #[test]
    fn test_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let err = PathSource::new(tmp.path().join("missing"))
            .fetch(&tmp.path().join("dest"))
            .unwrap_err();
        assert!(matches!(err, RecipeError::Fetch { ref tag, .. } if tag == "local"));
    }
}
