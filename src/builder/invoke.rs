//! Runs the native build in a configured source tree.
//!
//! Builds are not retried: a failed make can leave half-written objects
//! behind, and only a fresh tree is a safe starting point.

use std::path::{Path, PathBuf};

use crate::builder::msvc::{capture_environment, find_vcvarsall, EnvOverlay};
use crate::core::target::{TargetSpec, ToolchainFamily};
use crate::core::RecipeError;
use crate::util::config::ToolsConfig;
use crate::util::process::{combined_output, resolve_tool, ProcessBuilder};

/// How the configured tree will be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStrategy {
    /// `make -j<jobs>`
    Make { program: PathBuf, jobs: usize },
    /// `nmake` under the environment produced by `vcvarsall.bat`
    Nmake { program: PathBuf, vcvarsall: PathBuf },
}

impl BuildStrategy {
    /// Choose the strategy for a target and locate its tools.
    pub fn for_target(target: &TargetSpec, tools: &ToolsConfig) -> Result<Self, RecipeError> {
        match target.family() {
            ToolchainFamily::Unix => {
                let program = resolve_tool(tools.make.as_deref(), &["make", "gmake"])
                    .ok_or_else(|| missing_tool("make", "tools.make"))?;
                Ok(BuildStrategy::Make {
                    program,
                    jobs: job_count(tools),
                })
            }
            ToolchainFamily::Msvc => {
                let vcvarsall = find_vcvarsall(tools, target.compiler_version.as_deref())?;
                // nmake is usually only on PATH once vcvarsall has run
                let program = tools
                    .nmake
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("nmake"));
                Ok(BuildStrategy::Nmake { program, vcvarsall })
            }
        }
    }
}

fn missing_tool(name: &str, config_key: &str) -> RecipeError {
    RecipeError::Build {
        command: name.to_string(),
        status: None,
        output: format!("`{}` not found in PATH (set `{}` in config)", name, config_key),
    }
}

/// Parallel jobs: configured value, else the host's available parallelism.
pub fn job_count(tools: &ToolsConfig) -> usize {
    tools
        .jobs
        .filter(|&jobs| jobs > 0)
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
}

/// Build the configured tree at `source_dir`.
pub fn build(source_dir: &Path, target: &TargetSpec, tools: &ToolsConfig) -> Result<(), RecipeError> {
    let strategy = BuildStrategy::for_target(target, tools)?;
    run_strategy(source_dir, &strategy, target)
}

/// The build command for a strategy. The overlay is applied to the child
/// process only.
pub fn strategy_command(strategy: &BuildStrategy, overlay: &EnvOverlay) -> ProcessBuilder {
    match strategy {
        BuildStrategy::Make { program, jobs } => {
            ProcessBuilder::new(program).arg(format!("-j{}", jobs))
        }
        BuildStrategy::Nmake { program, .. } => ProcessBuilder::new(program).envs(overlay.vars()),
    }
}

/// Execute an already chosen strategy.
pub fn run_strategy(
    source_dir: &Path,
    strategy: &BuildStrategy,
    target: &TargetSpec,
) -> Result<(), RecipeError> {
    let overlay = match strategy {
        BuildStrategy::Nmake { vcvarsall, .. } => capture_environment(vcvarsall, target.cpu)?,
        BuildStrategy::Make { .. } => EnvOverlay::default(),
    };
    let cmd = strategy_command(strategy, &overlay).cwd(source_dir);

    tracing::info!("Building: {}", cmd.display_command());

    let output = cmd.exec().map_err(|e| RecipeError::Build {
        command: cmd.display_command(),
        status: None,
        output: format!("{:#}", e),
    })?;

    let text = combined_output(&output);
    if !output.status.success() {
        return Err(RecipeError::Build {
            command: cmd.display_command(),
            status: output.status.code(),
            output: text,
        });
    }

    tracing::debug!("build output:\n{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BuildSettings;
    use tempfile::TempDir;

    fn linux() -> TargetSpec {
        TargetSpec::resolve(&BuildSettings::new("Linux", "x86_64", "gcc")).unwrap()
    }

    #[test]
    fn test_job_count() {
        let tools = ToolsConfig {
            jobs: Some(3),
            ..ToolsConfig::default()
        };
        assert_eq!(job_count(&tools), 3);

        let auto = job_count(&ToolsConfig {
            jobs: Some(0),
            ..ToolsConfig::default()
        });
        assert!(auto >= 1);
    }

    #[test]
    fn test_msvc_strategy_uses_configured_tools() {
        let target = TargetSpec::resolve(
            &BuildSettings::new("Windows", "x86_64", "Visual Studio").with_runtime("MD"),
        )
        .unwrap();
        let tools = ToolsConfig {
            vcvarsall: Some(PathBuf::from("C:\\VS\\vcvarsall.bat")),
            ..ToolsConfig::default()
        };

        assert_eq!(
            BuildStrategy::for_target(&target, &tools).unwrap(),
            BuildStrategy::Nmake {
                program: PathBuf::from("nmake"),
                vcvarsall: PathBuf::from("C:\\VS\\vcvarsall.bat"),
            }
        );
    }

    #[test]
    fn test_nmake_overlay_reaches_child_only() {
        let strategy = BuildStrategy::Nmake {
            program: PathBuf::from("nmake"),
            vcvarsall: PathBuf::from("C:\\VS\\vcvarsall.bat"),
        };
        let overlay =
            EnvOverlay::parse_set_output("INCLUDE=C:\\VC\\include\nBOTAN_RECIPE_VCVARS=1\n");

        let cmd = strategy_command(&strategy, &overlay);
        assert_eq!(cmd.get_envs(), overlay.vars());
        assert!(cmd.get_args().is_empty());
        assert!(std::env::var("BOTAN_RECIPE_VCVARS").is_err());
    }

    #[test]
    fn test_make_command_has_no_overlay() {
        let strategy = BuildStrategy::Make {
            program: PathBuf::from("make"),
            jobs: 4,
        };

        let cmd = strategy_command(&strategy, &EnvOverlay::default());
        assert!(cmd.get_envs().is_empty());
        assert_eq!(cmd.get_args(), ["-j4"]);
    }

    /// Write an executable shell script standing in for make.
    #[cfg(unix)]
    fn fake_make(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-make");
        std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    #[cfg(unix)]
    fn test_make_strategy_runs_in_source_dir() {
        let tools = TempDir::new().unwrap();
        let source = TempDir::new().unwrap();
        let strategy = BuildStrategy::Make {
            program: fake_make(tools.path(), "echo \"$1\" > built.stamp\n"),
            jobs: 2,
        };

        run_strategy(source.path(), &strategy, &linux()).unwrap();
        let stamp = std::fs::read_to_string(source.path().join("built.stamp")).unwrap();
        assert_eq!(stamp.trim(), "-j2");
    }

    #[test]
    #[cfg(unix)]
    fn test_failed_build_is_not_retried() {
        let tools = TempDir::new().unwrap();
        let source = TempDir::new().unwrap();
        let strategy = BuildStrategy::Make {
            program: fake_make(
                tools.path(),
                "echo attempt >> attempts.log\necho 'make: *** [all] Error 2' >&2\nexit 2\n",
            ),
            jobs: 1,
        };

        let err = run_strategy(source.path(), &strategy, &linux()).unwrap_err();
        match err {
            RecipeError::Build { command, status, output } => {
                assert!(command.ends_with("fake-make -j1"));
                assert_eq!(status, Some(2));
                assert!(output.contains("Error 2"));
            }
            other => panic!("unexpected error: {}", other),
        }

        let attempts = std::fs::read_to_string(source.path().join("attempts.log")).unwrap();
        assert_eq!(attempts.lines().count(), 1);
    }
}
