//! Files staged into a package.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Kind of a packaged binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LibraryKind {
    /// Archive linked into the consumer (`.a`, static `.lib`)
    Static,
    /// Loaded at runtime (`.dll`, `.so*`, `.dylib*`)
    Shared,
    /// Stub for linking against a DLL (`.lib` of a shared MSVC build)
    Import,
}

impl fmt::Display for LibraryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryKind::Static => write!(f, "static"),
            LibraryKind::Shared => write!(f, "shared"),
            LibraryKind::Import => write!(f, "import"),
        }
    }
}

/// Everything copied into the package directory.
///
/// Paths are relative to the package root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactSet {
    pub license_file: PathBuf,
    pub headers: BTreeSet<PathBuf>,
    pub libraries: BTreeMap<LibraryKind, BTreeSet<PathBuf>>,
}

impl ArtifactSet {
    /// Libraries of one kind (empty if none were produced).
    pub fn libraries_of(&self, kind: LibraryKind) -> impl Iterator<Item = &PathBuf> {
        self.libraries.get(&kind).into_iter().flatten()
    }

    pub fn library_count(&self) -> usize {
        self.libraries.values().map(BTreeSet::len).sum()
    }

    /// All packaged files.
    pub fn all_files(&self) -> impl Iterator<Item = &PathBuf> {
        std::iter::once(&self.license_file)
            .chain(self.headers.iter())
            .chain(self.libraries.values().flatten())
    }
}
