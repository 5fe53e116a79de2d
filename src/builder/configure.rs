//! Runs the library's own `configure.py`.
//!
//! The script's output is not interpreted; only its exit status decides
//! success, and its output is carried into the error on failure.

use std::path::{Path, PathBuf};

use crate::builder::translate::{to_args, ConfigParameter};
use crate::core::RecipeError;
use crate::util::config::ToolsConfig;
use crate::util::process::{combined_output, resolve_tool, ProcessBuilder};

/// Name of the configure entry point at the root of the source tree.
pub const CONFIGURE_SCRIPT: &str = "configure.py";

/// Locate the Python interpreter used to run the configure script.
pub fn find_python(tools: &ToolsConfig) -> Option<PathBuf> {
    resolve_tool(tools.python.as_deref(), &["python3", "python", "py"])
}

/// Run `configure.py` inside `source_dir` with the given parameters.
pub fn configure(
    source_dir: &Path,
    params: &[ConfigParameter],
    tools: &ToolsConfig,
) -> Result<(), RecipeError> {
    let script = source_dir.join(CONFIGURE_SCRIPT);
    if !script.is_file() {
        return Err(RecipeError::Configuration {
            reason: format!("{} not found in {}", CONFIGURE_SCRIPT, source_dir.display()),
            status: None,
            output: String::new(),
        });
    }

    let python = find_python(tools).ok_or_else(|| RecipeError::Configuration {
        reason: "no Python interpreter found (set `tools.python` in config)".to_string(),
        status: None,
        output: String::new(),
    })?;

    let cmd = ProcessBuilder::new(python)
        .arg(CONFIGURE_SCRIPT)
        .args(to_args(params))
        .cwd(source_dir);

    tracing::info!("Configuring: {}", cmd.display_command());

    let output = cmd.exec().map_err(|e| RecipeError::Configuration {
        reason: format!("{:#}", e),
        status: None,
        output: String::new(),
    })?;

    let text = combined_output(&output);
    if !output.status.success() {
        return Err(RecipeError::Configuration {
            reason: format!(
                "`{}` exited with status {}",
                cmd.display_command(),
                output
                    .status
                    .code()
                    .map_or_else(|| "unknown".to_string(), |c| c.to_string())
            ),
            status: output.status.code(),
            output: text,
        });
    }

    tracing::debug!("configure output:\n{}", text);
    Ok(())
}
