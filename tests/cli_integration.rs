//! CLI integration tests for botan-recipe.
//!
//! These tests drive the binary end to end. Builds run against a local
//! source tree whose `configure.py` and `make` are shell scripts, so no
//! network access or C++ toolchain is needed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the botan-recipe binary command, isolated from the user's config.
fn recipe(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("botan-recipe").unwrap();
    cmd.env("HOME", home).env("USERPROFILE", home);
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

const LINUX_GCC: &[&str] = &[
    "-s",
    "os=Linux",
    "-s",
    "arch=x86_64",
    "-s",
    "compiler=gcc",
    "-s",
    "compiler.version=9",
    "-s",
    "compiler.libcxx=libstdc++11",
];

// ============================================================================
// botan-recipe args
// ============================================================================

#[test]
fn test_args_linux_gcc() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .arg("args")
        .args(LINUX_GCC)
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(
            "--os=linux\n--cc=gcc\n--cpu=x86_64\n--cc-abi-flags=-D_GLIBCXX_USE_CXX11_ABI=1\n\
             --cc-min-version=9.0\n--enable-shared-library\n--disable-static-library\n",
        );
}

#[test]
fn test_args_static_debug() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .arg("args")
        .args(LINUX_GCC)
        .args(["-s", "build_type=Debug", "-o", "shared=False"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "--debug-mode\n--enable-static-library\n--disable-shared-library\n",
        ));
}

#[test]
fn test_args_from_profile() {
    let tmp = temp_dir();
    let profile = tmp.path().join("msvc.toml");
    fs::write(
        &profile,
        r#"
[settings]
os = "Windows"
arch = "x86"
build_type = "Release"

[settings.compiler]
name = "Visual Studio"
version = "15"
runtime = "MT"

[options]
shared = false
"#,
    )
    .unwrap();

    recipe(tmp.path())
        .args(["args", "--profile"])
        .arg(&profile)
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(
            "--os=windows\n--cc=msvc\n--cpu=x86_32\n--msvc-runtime=MT\n\
             --enable-static-library\n--disable-shared-library\n",
        );
}

#[test]
fn test_args_unsupported_arch() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .arg("args")
        .args(LINUX_GCC)
        .args(["-s", "arch=armv8"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported setting `arch` = `armv8`"))
        .stderr(predicate::str::contains("help:"));
}

#[test]
fn test_args_unknown_setting_key() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .args(["args", "-s", "compiler.cppstd=17"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown setting `compiler.cppstd`"));
}

// ============================================================================
// botan-recipe info
// ============================================================================

#[test]
fn test_info_json() {
    let tmp = temp_dir();

    let output = recipe(tmp.path())
        .args(["info", "--json"])
        .args(LINUX_GCC)
        .args(["-o", "shared=False"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["libs"], serde_json::json!(["botan-2", "dl", "rt", "pthread"]));
    assert_eq!(info["defines"], serde_json::json!(["BOTAN_DLL="]));
}

#[test]
fn test_info_visual_studio() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .args(["info", "-s", "os=Windows", "-s", "arch=x86_64"])
        .args(["-s", "compiler=Visual Studio", "-s", "compiler.runtime=MD"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("libs:    botan user32 ws2_32"))
        .stdout(predicate::str::contains("defines: BOTAN_DLL=1"));
}

// ============================================================================
// botan-recipe completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("botan-recipe"));
}

// ============================================================================
// botan-recipe build / test-package
// ============================================================================

#[cfg(unix)]
fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, format!("#!/bin/sh\n{}", body)).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// A fake library tree plus a project config pointing at fake tools.
#[cfg(unix)]
fn fake_project(tmp: &Path) -> PathBuf {
    let upstream = tmp.join("upstream");
    fs::create_dir_all(&upstream).unwrap();
    fs::write(upstream.join("license.txt"), "Botan is released under the BSD-2 license").unwrap();
    fs::write(
        upstream.join("configure.py"),
        "echo \"$@\" > configure.log\n\
         mkdir -p build/include/botan\n\
         echo '#define BOTAN_VERSION_MAJOR 2' > build/include/botan/build.h\n",
    )
    .unwrap();

    let make = tmp.join("fake-make");
    write_script(
        &make,
        "echo \"$1\" > make.log\n\
         if grep -q enable-shared-library configure.log; then\n\
           echo elf > libbotan-2.so.10\n\
         else\n\
           echo ar > libbotan-2.a\n\
         fi\n",
    );

    let config_dir = tmp.join(".botan-recipe");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        format!(
            "[tools]\npython = \"sh\"\nmake = \"{}\"\njobs = 3\n",
            make.display()
        ),
    )
    .unwrap();

    upstream
}

#[test]
#[cfg(unix)]
fn test_build_local_source_tree() {
    let tmp = temp_dir();
    let upstream = fake_project(tmp.path());

    recipe(tmp.path())
        .arg("build")
        .args(LINUX_GCC)
        .arg("--source-dir")
        .arg(&upstream)
        .args(["--package-dir", "pkg"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Finished botan 2.10.0"));

    let pkg = tmp.path().join("pkg");
    assert!(pkg.join("licenses/license.txt").is_file());
    assert!(pkg.join("include/botan/build.h").is_file());
    assert!(pkg.join("lib/libbotan-2.so.10").is_file());
    assert!(!pkg.join("lib/libbotan-2.a").exists());

    let manifest = fs::read_to_string(pkg.join("package_info.json")).unwrap();
    assert!(manifest.contains("BOTAN_DLL=1"));
    assert!(manifest.contains("\"botan-2\""));

    // The local tree is copied, never configured in place
    assert!(!upstream.join("configure.log").exists());
}

#[test]
#[cfg(unix)]
fn test_build_static_uses_config_jobs() {
    let tmp = temp_dir();
    let upstream = fake_project(tmp.path());

    recipe(tmp.path())
        .arg("build")
        .args(LINUX_GCC)
        .args(["-o", "shared=False", "--package-dir", "pkg"])
        .arg("--source-dir")
        .arg(&upstream)
        .current_dir(tmp.path())
        .assert()
        .success();

    let pkg = tmp.path().join("pkg");
    assert!(pkg.join("lib/libbotan-2.a").is_file());

    let manifest = fs::read_to_string(pkg.join("package_info.json")).unwrap();
    assert!(manifest.contains("\"pthread\""));
    assert!(manifest.contains("\"BOTAN_DLL=\""));

    let work = tmp.path().join(".botan-recipe/work");
    let make_logs: Vec<String> = fs::read_dir(&work)
        .unwrap()
        .map(|entry| entry.unwrap().path().join("source/make.log"))
        .filter(|log| log.exists())
        .map(|log| fs::read_to_string(log).unwrap())
        .collect();
    assert_eq!(make_logs, vec!["-j3\n".to_string()]);
}

#[test]
#[cfg(unix)]
fn test_build_refuses_foreign_package_dir() {
    let tmp = temp_dir();
    let upstream = fake_project(tmp.path());

    recipe(tmp.path())
        .arg("build")
        .args(LINUX_GCC)
        .arg("--source-dir")
        .arg(&upstream)
        .args(["--package-dir", "."])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("contains the working directory"));

    fs::create_dir_all(tmp.path().join("docs")).unwrap();
    fs::write(tmp.path().join("docs/README"), "hand written").unwrap();

    recipe(tmp.path())
        .arg("build")
        .args(LINUX_GCC)
        .arg("--source-dir")
        .arg(&upstream)
        .args(["--package-dir", "docs"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to overwrite"));

    assert!(upstream.join("license.txt").is_file());
    assert!(tmp.path().join("docs/README").is_file());
}

#[test]
#[cfg(unix)]
fn test_build_reports_configure_failure() {
    let tmp = temp_dir();
    let upstream = fake_project(tmp.path());
    fs::write(
        upstream.join("configure.py"),
        "echo 'ERROR: Unknown or unidentified compiler' >&2\nexit 1\n",
    )
    .unwrap();

    recipe(tmp.path())
        .arg("build")
        .args(LINUX_GCC)
        .arg("--source-dir")
        .arg(&upstream)
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("configure step failed"))
        .stderr(predicate::str::contains("Unknown or unidentified compiler"));
}

#[test]
#[cfg(unix)]
fn test_build_missing_source_dir() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .arg("build")
        .args(LINUX_GCC)
        .args(["--source-dir", "does-not-exist"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to fetch"));
}

#[test]
#[cfg(unix)]
fn test_test_package_with_fake_compiler() {
    let tmp = temp_dir();
    let upstream = fake_project(tmp.path());

    recipe(tmp.path())
        .arg("build")
        .args(LINUX_GCC)
        .arg("--source-dir")
        .arg(&upstream)
        .args(["--package-dir", "pkg"])
        .current_dir(tmp.path())
        .assert()
        .success();

    // Writes a stand-in executable to the `-o` path
    let cxx = tmp.path().join("fake-cxx");
    write_script(
        &cxx,
        "echo \"$@\" > \"$(dirname \"$0\")/cxx.log\"\n\
         out=\"\"\n\
         while [ $# -gt 0 ]; do\n\
           if [ \"$1\" = \"-o\" ]; then out=\"$2\"; shift; fi\n\
           shift\n\
         done\n\
         printf '#!/bin/sh\\necho \"SHA-256: fake\"\\n' > \"$out\"\n\
         chmod +x \"$out\"\n",
    );

    recipe(tmp.path())
        .args(["test-package", "pkg", "--compiler"])
        .arg(&cxx)
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("SHA-256: fake"));

    let log = fs::read_to_string(tmp.path().join("cxx.log")).unwrap();
    assert!(log.contains("-DBOTAN_DLL=1"));
    assert!(log.contains("-lbotan-2 -ldl -lrt"));
}

#[test]
fn test_malformed_project_config_is_an_error() {
    let tmp = temp_dir();
    let config_dir = tmp.path().join(".botan-recipe");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[source]
version = 2.11.0
").unwrap();

    recipe(tmp.path())
        .args(["info"])
        .args(LINUX_GCC)
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"));
}

#[test]
fn test_test_package_requires_manifest() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .args(["test-package", "."])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("package_info.json"));
}
