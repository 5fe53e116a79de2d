//! Build settings as supplied by the caller.
//!
//! `BuildSettings` keeps the raw strings from a profile, the command line or
//! host detection. Nothing is validated here; `TargetSpec::resolve` turns the
//! record into closed enums and rejects anything it cannot map.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::process::{find_executable, ProcessBuilder};

/// Compiler descriptor: identity plus the sub-settings that depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerSettings {
    /// Compiler identity (`gcc`, `clang`, `apple-clang`, `Visual Studio`)
    pub name: String,

    /// Compiler version, e.g. `9` or `9.3`
    pub version: Option<String>,

    /// Standard library flavor (`libstdc++`, `libstdc++11`, `libc++`)
    pub libcxx: Option<String>,

    /// MSVC runtime (`MD`, `MT`, `MDd`, `MTd`)
    pub runtime: Option<String>,
}

/// The full settings record for one recipe run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSettings {
    pub os: String,
    pub arch: String,
    pub compiler: CompilerSettings,
    pub build_type: String,
    /// The `shared` option: build a shared library instead of a static one.
    pub shared: bool,
}

impl BuildSettings {
    /// Create settings for a target with a Release, shared build.
    pub fn new(os: impl Into<String>, arch: impl Into<String>, compiler: impl Into<String>) -> Self {
        BuildSettings {
            os: os.into(),
            arch: arch.into(),
            compiler: CompilerSettings {
                name: compiler.into(),
                ..CompilerSettings::default()
            },
            build_type: "Release".to_string(),
            shared: true,
        }
    }

    pub fn with_compiler_version(mut self, version: impl Into<String>) -> Self {
        self.compiler.version = Some(version.into());
        self
    }

    pub fn with_libcxx(mut self, libcxx: impl Into<String>) -> Self {
        self.compiler.libcxx = Some(libcxx.into());
        self
    }

    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.compiler.runtime = Some(runtime.into());
        self
    }

    pub fn with_build_type(mut self, build_type: impl Into<String>) -> Self {
        self.build_type = build_type.into();
        self
    }

    pub fn with_shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }

    /// Detect settings for the host machine.
    ///
    /// Mirrors what a package manager's default profile would contain. The
    /// result may still hold values the recipe does not support (e.g. macOS);
    /// those are reported when the settings are resolved.
    pub fn detect_host() -> Self {
        let os = match std::env::consts::OS {
            "windows" => "Windows",
            "linux" => "Linux",
            "macos" => "Macos",
            other => other,
        };

        let arch = match std::env::consts::ARCH {
            "x86" => "x86",
            "x86_64" => "x86_64",
            "aarch64" => "armv8",
            other => other,
        };

        let mut settings = match os {
            "Windows" => BuildSettings::new(os, arch, "Visual Studio").with_runtime("MD"),
            "Macos" => BuildSettings::new(os, arch, "apple-clang").with_libcxx("libc++"),
            _ => BuildSettings::new(os, arch, "gcc").with_libcxx("libstdc++11"),
        };

        if settings.compiler.name != "Visual Studio" {
            let cc = if settings.compiler.name == "gcc" { "gcc" } else { "clang" };
            settings.compiler.version = detect_compiler_version(cc);
        }

        tracing::debug!(
            "Detected host settings: os={}, arch={}, compiler={}",
            settings.os,
            settings.arch,
            settings.compiler.name
        );

        settings
    }

    /// Set a single setting from a `key=value` pair (the `-s` flag).
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.to_string();
        match key {
            "os" => self.os = value,
            "arch" => self.arch = value,
            "build_type" => self.build_type = value,
            "compiler" => {
                // Changing the compiler invalidates its sub-settings
                self.compiler = CompilerSettings {
                    name: value,
                    ..CompilerSettings::default()
                };
            }
            "compiler.version" => self.compiler.version = Some(value),
            "compiler.libcxx" => self.compiler.libcxx = Some(value),
            "compiler.runtime" => self.compiler.runtime = Some(value),
            _ => bail!(
                "unknown setting `{}`\n\
                 valid settings: os, arch, build_type, compiler, compiler.version, \
                 compiler.libcxx, compiler.runtime",
                key
            ),
        }
        Ok(())
    }

    /// Set a recipe option from a `key=value` pair (the `-o` flag).
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "shared" => {
                self.shared = parse_bool(value)
                    .with_context(|| format!("invalid value for option `shared`: `{}`", value))?;
            }
            _ => bail!("unknown option `{}`; the only option is `shared`", key),
        }
        Ok(())
    }

    /// Apply a list of `key=value` assignments.
    pub fn apply_assignments<'a>(
        &mut self,
        settings: impl IntoIterator<Item = &'a str>,
        options: impl IntoIterator<Item = &'a str>,
    ) -> Result<()> {
        for assignment in settings {
            let (key, value) = split_assignment(assignment)?;
            self.set(key, value)?;
        }
        for assignment in options {
            let (key, value) = split_assignment(assignment)?;
            self.set_option(key, value)?;
        }
        Ok(())
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self::detect_host()
    }
}

/// A settings profile loaded from TOML.
///
/// ```toml
/// [settings]
/// os = "Linux"
/// arch = "x86_64"
/// build_type = "Release"
///
/// [settings.compiler]
/// name = "gcc"
/// version = "9"
/// libcxx = "libstdc++11"
///
/// [options]
/// shared = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub settings: ProfileSettings,
    pub options: ProfileOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    pub os: Option<String>,
    pub arch: Option<String>,
    pub build_type: Option<String>,
    pub compiler: Option<CompilerSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOptions {
    pub shared: Option<bool>,
}

impl Profile {
    /// Load a profile from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read profile: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("failed to parse profile: {}", path.display()))
    }

    /// Parse a profile from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Overlay the values present in this profile onto `settings`.
    pub fn apply(&self, settings: &mut BuildSettings) {
        if let Some(ref os) = self.settings.os {
            settings.os = os.clone();
        }
        if let Some(ref arch) = self.settings.arch {
            settings.arch = arch.clone();
        }
        if let Some(ref build_type) = self.settings.build_type {
            settings.build_type = build_type.clone();
        }
        if let Some(ref compiler) = self.settings.compiler {
            settings.compiler = compiler.clone();
        }
        if let Some(shared) = self.options.shared {
            settings.shared = shared;
        }
    }
}

fn split_assignment(assignment: &str) -> Result<(&str, &str)> {
    match assignment.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => bail!("expected `key=value`, got `{}`", assignment),
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => bail!("expected a boolean (True/False)"),
    }
}

/// Ask a compiler for its version via `-dumpversion`.
fn detect_compiler_version(cc: &str) -> Option<String> {
    let path = find_executable(cc)?;
    let output = ProcessBuilder::new(path).arg("-dumpversion").exec().ok()?;
    if !output.status.success() {
        return None;
    }

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}
