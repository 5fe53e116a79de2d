//! Recipe error kinds.
//!
//! Every pipeline step fails with exactly one of these. Nothing is retried:
//! fetch, configure and build all mutate the working tree, so the caller has
//! to start again from a clean directory.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error raised by one of the recipe steps.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("failed to fetch `{url}` at `{tag}`: {reason}")]
    Fetch {
        url: String,
        tag: String,
        reason: String,
    },

    #[error("unsupported setting `{setting}` = `{value}`")]
    UnsupportedSetting { setting: String, value: String },

    #[error("configure step failed: {reason}")]
    Configuration {
        reason: String,
        status: Option<i32>,
        output: String,
    },

    #[error("build step failed: `{command}` exited with {}", display_status(*status))]
    Build {
        command: String,
        status: Option<i32>,
        output: String,
    },

    #[error("packaging from {} failed: {reason}", dir.display())]
    Assembly { reason: String, dir: PathBuf },
}

fn display_status(status: Option<i32>) -> String {
    match status {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl RecipeError {
    /// Shorthand for a setting value that has no mapping.
    pub fn unsupported(setting: impl Into<String>, value: impl Into<String>) -> Self {
        RecipeError::UnsupportedSetting {
            setting: setting.into(),
            value: value.into(),
        }
    }

    /// Shorthand for a required setting that was never supplied.
    pub fn missing(setting: impl Into<String>) -> Self {
        Self::unsupported(setting, "<unset>")
    }

    /// Shorthand for a required file pattern that matched nothing.
    pub fn no_match(pattern: &str, dir: impl Into<PathBuf>) -> Self {
        RecipeError::Assembly {
            reason: format!("no files matching `{}`", pattern),
            dir: dir.into(),
        }
    }

    /// Name of the pipeline step this error belongs to.
    pub fn step(&self) -> &'static str {
        match self {
            RecipeError::Fetch { .. } => "source",
            RecipeError::UnsupportedSetting { .. } => "translate",
            RecipeError::Configuration { .. } => "configure",
            RecipeError::Build { .. } => "build",
            RecipeError::Assembly { .. } => "package",
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string())
            .with_context(format!("while running the `{}` step", self.step()));

        match self {
            RecipeError::Fetch { .. } => diag.with_suggestion(suggestions::FETCH_FAILED),
            RecipeError::UnsupportedSetting { setting, .. } => diag.with_suggestion(format!(
                "help: Pass a supported value with `-s {}=<value>` or edit your profile",
                setting
            )),
            RecipeError::Configuration { output, .. } | RecipeError::Build { output, .. } => {
                let mut diag = diag;
                if !output.trim().is_empty() {
                    diag = diag.with_context(output.trim_end().to_string());
                }
                diag.with_suggestion(suggestions::CLEAN_REBUILD)
            }
            RecipeError::Assembly { dir, .. } => diag
                .with_location(dir.clone())
                .with_suggestion(suggestions::CHECK_LAYOUT),
        }
    }
}
