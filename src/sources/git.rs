//! Git source - the library tree at a release tag.

use std::path::Path;

use git2::{Repository, ResetType};
use url::Url;

use crate::core::RecipeError;
use crate::sources::Source;

/// A git repository pinned to a tag.
pub struct GitSource {
    /// Remote repository URL
    remote: String,

    /// Tag to check out
    tag: String,
}

impl GitSource {
    pub fn new(remote: impl Into<String>, tag: impl Into<String>) -> Self {
        GitSource {
            remote: remote.into(),
            tag: tag.into(),
        }
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    fn error(&self, reason: impl Into<String>) -> RecipeError {
        RecipeError::Fetch {
            url: self.remote.clone(),
            tag: self.tag.clone(),
            reason: reason.into(),
        }
    }

    /// Remote spec handed to libgit2: a URL, or an existing local path.
    fn remote_spec(&self) -> Result<String, RecipeError> {
        if Path::new(&self.remote).exists() {
            return Ok(self.remote.clone());
        }

        Url::parse(&self.remote)
            .map(String::from)
            .map_err(|e| self.error(format!("invalid repository URL: {}", e)))
    }

    fn checkout_tag(&self, repo: &Repository) -> Result<String, RecipeError> {
        let reference = repo
            .find_reference(&format!("refs/tags/{}", self.tag))
            .map_err(|_| self.error(format!("tag `{}` does not exist", self.tag)))?;

        let commit = reference
            .peel_to_commit()
            .map_err(|e| self.error(format!("tag `{}` is not a commit: {}", self.tag, e)))?;

        repo.reset(commit.as_object(), ResetType::Hard, None)
            .map_err(|e| self.error(format!("failed to check out `{}`: {}", self.tag, e)))?;

        Ok(commit.id().to_string())
    }
}

impl Source for GitSource {
    fn describe(&self) -> String {
        format!("{} ({})", self.remote, self.tag)
    }

    fn fetch(&self, dest: &Path) -> Result<(), RecipeError> {
        let remote = self.remote_spec()?;

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                self.error(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        tracing::info!("Cloning {}", self.remote);

        let repo = Repository::clone(&remote, dest).map_err(|e| self.error(e.message()))?;
        let precise = self.checkout_tag(&repo)?;

        tracing::info!("Checked out {} at {}", self.tag, &precise[..precise.len().min(12)]);
        Ok(())
    }
}
