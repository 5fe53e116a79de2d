//! Implementation of `botan-recipe test-package`.
//!
//! Compiles a small consumer program against a finished package using only
//! what `package_info.json` says, then runs it.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::builder::msvc::{capture_environment, find_vcvarsall};
use crate::core::target::ToolchainFamily;
use crate::core::PackageManifest;
use crate::util::config::ToolsConfig;
use crate::util::process::{combined_output, resolve_tool, ProcessBuilder};

/// Consumer program compiled by default.
pub const EXAMPLE_SOURCE: &str = include_str!("../../demos/test_package/example.cpp");

/// Options for the test-package command.
#[derive(Debug, Clone, Default)]
pub struct TestPackageOptions {
    /// Package directory containing `package_info.json`
    pub package_dir: PathBuf,

    /// Consumer source file (defaults to the bundled example)
    pub source: Option<PathBuf>,

    /// C++ compiler driver (defaults to the first of c++, g++, clang++ on PATH)
    pub compiler: Option<PathBuf>,

    /// Tool locations
    pub tools: ToolsConfig,
}

/// Output of a consumer run.
#[derive(Debug)]
pub struct TestPackageResult {
    /// Compile command line
    pub compile_command: String,

    /// Consumer program stdout
    pub stdout: String,
}

/// Compile-and-link command for a consumer, driven by the package manifest.
pub fn consumer_command(
    manifest: &PackageManifest,
    package_dir: &Path,
    compiler: &Path,
    source: &Path,
    output: &Path,
) -> ProcessBuilder {
    let include = package_dir.join("include");
    let lib = package_dir.join("lib");

    match manifest.target.family() {
        ToolchainFamily::Unix => {
            let mut cmd = ProcessBuilder::new(compiler)
                .arg("-std=c++11")
                .arg(format!("-I{}", include.display()));
            for define in &manifest.info.defines {
                cmd = cmd.arg(format!("-D{}", define));
            }
            cmd = cmd
                .arg(source)
                .arg("-o")
                .arg(output)
                .arg(format!("-L{}", lib.display()))
                .arg(format!("-Wl,-rpath,{}", lib.display()));
            for name in &manifest.info.libs {
                cmd = cmd.arg(format!("-l{}", name));
            }
            cmd
        }
        ToolchainFamily::Msvc => {
            let mut cmd = ProcessBuilder::new(compiler)
                .args(["/nologo", "/EHsc"])
                .arg(format!("/I{}", include.display()));
            for define in &manifest.info.defines {
                cmd = cmd.arg(format!("/D{}", define));
            }
            if let Some(runtime) = manifest.target.runtime.as_deref() {
                cmd = cmd.arg(format!("/{}", runtime));
            }
            cmd = cmd
                .arg(source)
                .arg(format!("/Fe{}", output.display()))
                .arg("/link")
                .arg(format!("/LIBPATH:{}", lib.display()));
            for name in &manifest.info.libs {
                cmd = cmd.arg(format!("{}.lib", name));
            }
            cmd
        }
    }
}

/// Build and run the consumer program against a package.
pub fn test_package(opts: &TestPackageOptions) -> Result<TestPackageResult> {
    let manifest = PackageManifest::load(&opts.package_dir)?;
    let family = manifest.target.family();

    let scratch = tempfile::Builder::new()
        .prefix("botan-recipe-test")
        .tempdir()
        .context("failed to create scratch directory")?;

    let source = match opts.source {
        Some(ref source) => source.clone(),
        None => {
            let path = scratch.path().join("example.cpp");
            std::fs::write(&path, EXAMPLE_SOURCE)
                .with_context(|| format!("failed to write {}", path.display()))?;
            path
        }
    };

    let exe_name = match family {
        ToolchainFamily::Msvc => "example.exe",
        ToolchainFamily::Unix => "example",
    };
    let exe = scratch.path().join(exe_name);

    let defaults: &[&str] = match family {
        ToolchainFamily::Msvc => &["cl"],
        ToolchainFamily::Unix => &["c++", "g++", "clang++"],
    };
    let compiler = match family {
        // cl.exe is only on PATH inside the vcvars environment
        ToolchainFamily::Msvc => opts.compiler.clone().unwrap_or_else(|| PathBuf::from("cl")),
        ToolchainFamily::Unix => resolve_tool(opts.compiler.as_deref(), defaults)
            .with_context(|| format!("no C++ compiler found (tried {})", defaults.join(", ")))?,
    };

    let mut compile =
        consumer_command(&manifest, &opts.package_dir, &compiler, &source, &exe).cwd(scratch.path());
    let mut run = ProcessBuilder::new(&exe).cwd(scratch.path());

    if family == ToolchainFamily::Msvc {
        let vcvarsall = find_vcvarsall(&opts.tools, manifest.target.compiler_version.as_deref())?;
        let overlay = capture_environment(&vcvarsall, manifest.target.cpu)?;
        compile = compile.envs(overlay.vars());

        // The DLL lives in bin/
        let bin = opts.package_dir.join("bin");
        let path = std::env::var("PATH").unwrap_or_default();
        run = run.env("PATH", format!("{};{}", bin.display(), path));
    }

    let compile_command = compile.display_command();
    tracing::info!("Compiling consumer: {}", compile_command);

    let output = compile.exec()?;
    if !output.status.success() {
        bail!(
            "consumer program failed to compile:\n{}",
            combined_output(&output).trim_end()
        );
    }

    tracing::info!("Running {}", exe.display());
    let output = run.exec()?;
    if !output.status.success() {
        bail!(
            "consumer program exited with {}:\n{}",
            output.status,
            combined_output(&output).trim_end()
        );
    }

    Ok(TestPackageResult {
        compile_command,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BuildSettings, PackageInfo, TargetSpec};
    use semver::Version;

    fn manifest(settings: BuildSettings) -> PackageManifest {
        let target = TargetSpec::resolve(&settings).unwrap();
        let version = Version::new(2, 10, 0);
        PackageManifest {
            name: "botan".to_string(),
            info: PackageInfo::for_target(&target, &version),
            version,
            target,
            files: Default::default(),
        }
    }

    fn args(cmd: &ProcessBuilder) -> Vec<String> {
        cmd.get_args().to_vec()
    }

    #[test]
    #[cfg(unix)]
    fn test_unix_consumer_flags() {
        let m = manifest(BuildSettings::new("Linux", "x86_64", "gcc").with_shared(false));
        let cmd = consumer_command(
            &m,
            Path::new("/pkg"),
            Path::new("c++"),
            Path::new("example.cpp"),
            Path::new("example"),
        );

        assert_eq!(
            args(&cmd),
            vec![
                "-std=c++11",
                "-I/pkg/include",
                "-DBOTAN_DLL=",
                "example.cpp",
                "-o",
                "example",
                "-L/pkg/lib",
                "-Wl,-rpath,/pkg/lib",
                "-lbotan-2",
                "-ldl",
                "-lrt",
                "-lpthread",
            ]
        );
    }

    #[test]
    fn test_msvc_consumer_flags() {
        let m = manifest(
            BuildSettings::new("Windows", "x86_64", "Visual Studio").with_runtime("MD"),
        );
        let cmd = consumer_command(
            &m,
            Path::new("pkg"),
            Path::new("cl"),
            Path::new("example.cpp"),
            Path::new("example.exe"),
        );
        let args = args(&cmd);

        assert!(args.contains(&"/DBOTAN_DLL=1".to_string()));
        assert!(args.contains(&"/MD".to_string()));
        assert!(args.contains(&"/Feexample.exe".to_string()));

        let link = args.iter().position(|a| a == "/link").unwrap();
        assert_eq!(
            &args[link + 2..],
            &["botan.lib", "user32.lib", "ws2_32.lib"]
        );
    }

    #[test]
    fn test_bundled_example_uses_botan() {
        assert!(EXAMPLE_SOURCE.contains("#include <botan/hash.h>"));
    }

    #[test]
    fn test_missing_manifest_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        let opts = TestPackageOptions {
            package_dir: tmp.path().to_path_buf(),
            ..TestPackageOptions::default()
        };
        let err = test_package(&opts).unwrap_err();
        assert!(format!("{:#}", err).contains("package_info.json"));
    }
}
