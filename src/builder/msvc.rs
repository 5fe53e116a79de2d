//! Visual Studio build environment.
//!
//! `vcvarsall.bat` only works by mutating the environment of the shell that
//! calls it. We run it in a throwaway `cmd` that prints the resulting
//! environment, keep the variables it changed as an [`EnvOverlay`], and hand
//! that overlay to the build subprocess. Our own process environment is
//! never touched.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::target::Cpu;
use crate::core::RecipeError;
use crate::util::config::ToolsConfig;
use crate::util::process::{combined_output, find_executable, ProcessBuilder};

/// Environment variables to set on a single child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverlay {
    vars: BTreeMap<String, String>,
}

impl EnvOverlay {
    /// Parse the output of `set` (one `NAME=value` per line).
    pub fn parse_set_output(text: &str) -> Self {
        let vars = text
            .lines()
            .filter_map(|line| line.split_once('='))
            .filter(|(key, _)| !key.is_empty())
            .map(|(key, value)| (key.to_uppercase(), value.trim_end_matches('\r').to_string()))
            .collect();

        EnvOverlay { vars }
    }

    /// Keep only variables whose value differs from `base`.
    pub fn changed_from(self, base: impl Fn(&str) -> Option<String>) -> Self {
        let vars = self
            .vars
            .into_iter()
            .filter(|(key, value)| base(key.as_str()).as_deref() != Some(value.as_str()))
            .collect();

        EnvOverlay { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Version range for `vswhere -version` from a Visual Studio major version.
///
/// `15` (VS 2017) becomes `[15.0,16.0)`.
pub fn vswhere_version_range(compiler_version: &str) -> Option<String> {
    let major: u32 = compiler_version.split('.').next()?.parse().ok()?;
    Some(format!("[{}.0,{}.0)", major, major + 1))
}

fn env_error(command: impl Into<String>, status: Option<i32>, output: impl Into<String>) -> RecipeError {
    RecipeError::Build {
        command: command.into(),
        status,
        output: output.into(),
    }
}

/// Find vswhere.exe in its standard location or PATH.
fn find_vswhere() -> Option<PathBuf> {
    let program_files_x86 = std::env::var("ProgramFiles(x86)")
        .unwrap_or_else(|_| "C:\\Program Files (x86)".to_string());

    let standard_path = PathBuf::from(&program_files_x86)
        .join("Microsoft Visual Studio")
        .join("Installer")
        .join("vswhere.exe");

    if standard_path.exists() {
        return Some(standard_path);
    }

    find_executable("vswhere")
}

/// Locate `vcvarsall.bat` for the requested Visual Studio version.
pub fn find_vcvarsall(
    tools: &ToolsConfig,
    compiler_version: Option<&str>,
) -> Result<PathBuf, RecipeError> {
    if let Some(ref vcvarsall) = tools.vcvarsall {
        return Ok(vcvarsall.clone());
    }

    let vswhere = find_vswhere().ok_or_else(|| {
        env_error(
            "vswhere",
            None,
            "vswhere.exe not found; set `tools.vcvarsall` in config",
        )
    })?;

    let mut cmd = ProcessBuilder::new(&vswhere).args([
        "-products",
        "*",
        "-requires",
        "Microsoft.VisualStudio.Component.VC.Tools.x86.x64",
        "-property",
        "installationPath",
        "-format",
        "value",
    ]);
    cmd = match compiler_version.and_then(vswhere_version_range) {
        Some(range) => cmd.args(["-version", range.as_str()]),
        None => cmd.arg("-latest"),
    };

    let output = cmd
        .exec()
        .map_err(|e| env_error(cmd.display_command(), None, format!("{:#}", e)))?;
    if !output.status.success() {
        return Err(env_error(
            cmd.display_command(),
            output.status.code(),
            combined_output(&output),
        ));
    }

    let install = String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .ok_or_else(|| {
            env_error(
                cmd.display_command(),
                output.status.code(),
                format!(
                    "no Visual Studio installation matches version {}",
                    compiler_version.unwrap_or("(any)")
                ),
            )
        })?;

    let vcvarsall = Path::new(&install)
        .join("VC")
        .join("Auxiliary")
        .join("Build")
        .join("vcvarsall.bat");

    tracing::debug!("Using {}", vcvarsall.display());
    Ok(vcvarsall)
}

/// Run `vcvarsall.bat <arch>` in a child shell and capture what it changes.
pub fn capture_environment(vcvarsall: &Path, cpu: Cpu) -> Result<EnvOverlay, RecipeError> {
    if !vcvarsall.exists() {
        return Err(env_error(
            vcvarsall.display().to_string(),
            None,
            "vcvarsall.bat does not exist",
        ));
    }

    // A batch file avoids cmd.exe quoting rules for paths with spaces
    let batch_content = format!(
        "@echo off\r\ncall \"{}\" {} >nul 2>&1\r\nif errorlevel 1 exit /b 1\r\nset\r\n",
        vcvarsall.display(),
        cpu.vcvars_arch()
    );

    let mut batch = tempfile::Builder::new()
        .prefix("botan-recipe-vcvars")
        .suffix(".bat")
        .tempfile()
        .map_err(|e| env_error("vcvarsall", None, e.to_string()))?;
    batch
        .write_all(batch_content.as_bytes())
        .map_err(|e| env_error("vcvarsall", None, e.to_string()))?;

    let cmd = ProcessBuilder::new("cmd").arg("/c").arg(batch.path());

    tracing::info!(
        "Setting up Visual Studio environment: {} {}",
        vcvarsall.display(),
        cpu.vcvars_arch()
    );

    let output = cmd
        .exec()
        .map_err(|e| env_error(cmd.display_command(), None, format!("{:#}", e)))?;
    if !output.status.success() {
        return Err(env_error(
            cmd.display_command(),
            output.status.code(),
            combined_output(&output),
        ));
    }

    let overlay = EnvOverlay::parse_set_output(&String::from_utf8_lossy(&output.stdout))
        .changed_from(|key| std::env::var(key).ok());

    if overlay.get("INCLUDE").is_none() && overlay.get("PATH").is_none() {
        return Err(env_error(
            cmd.display_command(),
            output.status.code(),
            "vcvarsall.bat did not set up a compiler environment",
        ));
    }

    Ok(overlay)
}
