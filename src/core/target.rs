//! Resolved target description.
//!
//! `TargetSpec` is the strongly typed form of [`BuildSettings`]. Every field
//! is a closed enum, so later steps can match exhaustively instead of
//! comparing strings. Resolution fails fast with
//! [`RecipeError::UnsupportedSetting`] on the first value it cannot map.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::RecipeError;
use crate::core::settings::BuildSettings;
use crate::util::hash::Fingerprint;

/// Target operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Os {
    Windows,
    Linux,
}

impl Os {
    pub fn parse(value: &str) -> Result<Self, RecipeError> {
        match value {
            "Windows" => Ok(Os::Windows),
            "Linux" => Ok(Os::Linux),
            _ => Err(RecipeError::unsupported("os", value)),
        }
    }

    /// Platform token understood by `configure.py --os`.
    pub fn configure_token(self) -> &'static str {
        match self {
            Os::Windows => "windows",
            Os::Linux => "linux",
        }
    }
}

/// Target CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cpu {
    X86_32,
    X86_64,
}

impl Cpu {
    pub fn parse(value: &str) -> Result<Self, RecipeError> {
        match value {
            "x86" => Ok(Cpu::X86_32),
            "x86_64" => Ok(Cpu::X86_64),
            _ => Err(RecipeError::unsupported("arch", value)),
        }
    }

    /// CPU token understood by `configure.py --cpu`.
    pub fn configure_token(self) -> &'static str {
        match self {
            Cpu::X86_32 => "x86_32",
            Cpu::X86_64 => "x86_64",
        }
    }

    /// Architecture argument for `vcvarsall.bat`.
    pub fn vcvars_arch(self) -> &'static str {
        match self {
            Cpu::X86_32 => "x86",
            Cpu::X86_64 => "amd64",
        }
    }
}

/// Compiler identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compiler {
    VisualStudio,
    Gcc,
    Clang,
    AppleClang,
}

impl Compiler {
    pub fn parse(value: &str) -> Result<Self, RecipeError> {
        match value {
            "Visual Studio" => Ok(Compiler::VisualStudio),
            "gcc" => Ok(Compiler::Gcc),
            "clang" => Ok(Compiler::Clang),
            "apple-clang" => Ok(Compiler::AppleClang),
            _ => Err(RecipeError::unsupported("compiler", value)),
        }
    }

    /// Toolchain token understood by `configure.py --cc`.
    ///
    /// gcc targeting Windows is the MinGW flavor of the toolchain.
    pub fn configure_token(self, os: Os) -> &'static str {
        match (self, os) {
            (Compiler::VisualStudio, _) => "msvc",
            (Compiler::Gcc, Os::Windows) => "mingw",
            (Compiler::Gcc, Os::Linux) => "gcc",
            (Compiler::Clang | Compiler::AppleClang, _) => "clang",
        }
    }

    pub fn family(self) -> ToolchainFamily {
        match self {
            Compiler::VisualStudio => ToolchainFamily::Msvc,
            Compiler::Gcc | Compiler::Clang | Compiler::AppleClang => ToolchainFamily::Unix,
        }
    }
}

/// How the configured tree is built and what the package looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolchainFamily {
    /// Visual Studio: `vcvarsall.bat` + `nmake`, DLLs in `bin/`
    Msvc,
    /// Everything else: `make -jN`
    Unix,
}

/// Build type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildType {
    Debug,
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub fn parse(value: &str) -> Result<Self, RecipeError> {
        match value {
            "Debug" => Ok(BuildType::Debug),
            "Release" => Ok(BuildType::Release),
            "RelWithDebInfo" => Ok(BuildType::RelWithDebInfo),
            "MinSizeRel" => Ok(BuildType::MinSizeRel),
            _ => Err(RecipeError::unsupported("build_type", value)),
        }
    }

    pub fn is_debug(self) -> bool {
        self == BuildType::Debug
    }
}

/// Whether the library is built shared or static.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkMode {
    Shared,
    Static,
}

impl LinkMode {
    pub fn from_shared(shared: bool) -> Self {
        if shared {
            LinkMode::Shared
        } else {
            LinkMode::Static
        }
    }

    pub fn is_shared(self) -> bool {
        self == LinkMode::Shared
    }
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkMode::Shared => write!(f, "shared"),
            LinkMode::Static => write!(f, "static"),
        }
    }
}

/// Fully resolved settings for one recipe run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetSpec {
    pub os: Os,
    pub cpu: Cpu,
    pub compiler: Compiler,
    pub compiler_version: Option<String>,
    pub libcxx: Option<String>,
    pub runtime: Option<String>,
    pub build_type: BuildType,
    pub link_mode: LinkMode,
}

impl TargetSpec {
    /// Resolve raw settings, in the order the configure arguments are emitted.
    pub fn resolve(settings: &BuildSettings) -> Result<Self, RecipeError> {
        let os = Os::parse(&settings.os)?;
        let compiler = Compiler::parse(&settings.compiler.name)?;
        let cpu = Cpu::parse(&settings.arch)?;
        let build_type = BuildType::parse(&settings.build_type)?;

        Ok(TargetSpec {
            os,
            cpu,
            compiler,
            compiler_version: settings.compiler.version.clone(),
            libcxx: settings.compiler.libcxx.clone(),
            runtime: settings.compiler.runtime.clone(),
            build_type,
            link_mode: LinkMode::from_shared(settings.shared),
        })
    }

    pub fn family(&self) -> ToolchainFamily {
        self.compiler.family()
    }

    /// Stable identifier for this settings combination and library version.
    ///
    /// Used to give every combination its own working directory, since the
    /// configure step writes into the source tree.
    pub fn fingerprint(&self, library_version: &str) -> String {
        let mut fp = Fingerprint::new();
        fp.update_str(library_version)
            .update_str(self.os.configure_token())
            .update_str(self.cpu.configure_token())
            .update_str(self.compiler.configure_token(self.os))
            .update_str(&format!("{:?}", self.compiler))
            .update_opt(self.compiler_version.as_deref())
            .update_opt(self.libcxx.as_deref())
            .update_opt(self.runtime.as_deref())
            .update_str(&format!("{:?}", self.build_type))
            .update_str(&self.link_mode.to_string());
        fp.finish_short()
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{} {:?} {}",
            self.os.configure_token(),
            self.cpu.configure_token(),
            self.compiler.configure_token(self.os),
            self.build_type,
            self.link_mode
        )
    }
}
