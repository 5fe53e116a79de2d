//! Settings to `configure.py` arguments.
//!
//! Output order is fixed: os, cc, cpu, toolchain extras, debug mode, then the
//! link-mode pair. The same settings always produce the same argument list.

use std::fmt;

use crate::core::target::{Compiler, LinkMode, TargetSpec};
use crate::core::{BuildSettings, RecipeError};

/// One argument to the library's configure script.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigParameter {
    pub key: String,
    pub value: Option<String>,
}

impl ConfigParameter {
    /// A `--key=value` parameter.
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        ConfigParameter {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// A bare `--key` flag.
    pub fn flag(key: impl Into<String>) -> Self {
        ConfigParameter {
            key: key.into(),
            value: None,
        }
    }

    /// Command-line form, e.g. `--cpu=x86_64`.
    pub fn to_arg(&self) -> String {
        match self.value {
            Some(ref value) => format!("--{}={}", self.key, value),
            None => format!("--{}", self.key),
        }
    }
}

impl fmt::Display for ConfigParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(ref value) => write!(f, "{}={}", self.key, value),
            None => write!(f, "{}", self.key),
        }
    }
}

/// Translate raw settings. Fails without a partial list on any unmapped value.
pub fn translate(settings: &BuildSettings) -> Result<Vec<ConfigParameter>, RecipeError> {
    let target = TargetSpec::resolve(settings)?;
    translate_target(&target)
}

/// Translate an already resolved target.
pub fn translate_target(target: &TargetSpec) -> Result<Vec<ConfigParameter>, RecipeError> {
    let mut params = vec![
        ConfigParameter::with_value("os", target.os.configure_token()),
        ConfigParameter::with_value("cc", target.compiler.configure_token(target.os)),
        ConfigParameter::with_value("cpu", target.cpu.configure_token()),
    ];

    match target.compiler {
        Compiler::Gcc => {
            if let Some(flags) = target.libcxx.as_deref().and_then(gcc_abi_flags) {
                params.push(ConfigParameter::with_value("cc-abi-flags", flags));
            }

            let version = target
                .compiler_version
                .as_deref()
                .ok_or_else(|| RecipeError::missing("compiler.version"))?;
            params.push(ConfigParameter::with_value(
                "cc-min-version",
                normalize_version(version)?,
            ));
        }
        Compiler::VisualStudio => {
            let runtime = target
                .runtime
                .as_deref()
                .ok_or_else(|| RecipeError::missing("compiler.runtime"))?;
            params.push(ConfigParameter::with_value("msvc-runtime", runtime));
        }
        Compiler::Clang | Compiler::AppleClang => {}
    }

    if target.build_type.is_debug() {
        params.push(ConfigParameter::flag("debug-mode"));
    }

    params.extend(link_mode_flags(target.link_mode));

    Ok(params)
}

/// The mutually exclusive pair of library-kind flags.
pub fn link_mode_flags(link_mode: LinkMode) -> [ConfigParameter; 2] {
    match link_mode {
        LinkMode::Shared => [
            ConfigParameter::flag("enable-shared-library"),
            ConfigParameter::flag("disable-static-library"),
        ],
        LinkMode::Static => [
            ConfigParameter::flag("enable-static-library"),
            ConfigParameter::flag("disable-shared-library"),
        ],
    }
}

/// ABI pin for libstdc++'s dual ABI. Unknown flavors get no flag.
fn gcc_abi_flags(libcxx: &str) -> Option<&'static str> {
    match libcxx {
        "libstdc++" => Some("-D_GLIBCXX_USE_CXX11_ABI=0"),
        "libstdc++11" => Some("-D_GLIBCXX_USE_CXX11_ABI=1"),
        _ => None,
    }
}

/// Bring a compiler version to at least `major.minor` form.
fn normalize_version(version: &str) -> Result<String, RecipeError> {
    let components: Vec<&str> = version.split('.').collect();
    if components.iter().any(|c| c.is_empty()) {
        return Err(RecipeError::unsupported("compiler.version", version));
    }

    if components.len() >= 2 {
        Ok(version.to_string())
    } else {
        Ok(format!("{}.0", version))
    }
}

/// Render parameters as command-line arguments.
pub fn to_args(params: &[ConfigParameter]) -> Vec<String> {
    params.iter().map(ConfigParameter::to_arg).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn keys(params: &[ConfigParameter]) -> Vec<String> {
        params.iter().map(|p| p.key.clone()).collect()
    }

    fn value<'a>(params: &'a [ConfigParameter], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|p| p.key == key)
            .and_then(|p| p.value.as_deref())
    }

    fn gcc(libcxx: &str) -> BuildSettings {
        BuildSettings::new("Linux", "x86_64", "gcc")
            .with_compiler_version("9.3")
            .with_libcxx(libcxx)
    }

    #[test]
    fn test_linux_gcc_shared_release() {
        let params = translate(&gcc("libstdc++11")).unwrap();
        let rendered: Vec<String> = params.iter().map(ToString::to_string).collect();

        assert_eq!(
            rendered,
            vec![
                "os=linux",
                "cc=gcc",
                "cpu=x86_64",
                "cc-abi-flags=-D_GLIBCXX_USE_CXX11_ABI=1",
                "cc-min-version=9.3",
                "enable-shared-library",
                "disable-static-library",
            ]
        );
    }

    #[test]
    fn test_gcc_abi_flags_by_flavor() {
        let params = translate(&gcc("libstdc++")).unwrap();
        assert_eq!(value(&params, "cc-abi-flags"), Some("-D_GLIBCXX_USE_CXX11_ABI=0"));

        let params = translate(&gcc("libstdc++11")).unwrap();
        assert_eq!(value(&params, "cc-abi-flags"), Some("-D_GLIBCXX_USE_CXX11_ABI=1"));

        let params = translate(&gcc("libc++")).unwrap();
        assert!(!keys(&params).contains(&"cc-abi-flags".to_string()));

        let no_flavor = BuildSettings::new("Linux", "x86_64", "gcc").with_compiler_version("9");
        let params = translate(&no_flavor).unwrap();
        assert!(!keys(&params).contains(&"cc-abi-flags".to_string()));
    }

    #[test]
    fn test_min_version_normalization() {
        let params = translate(&gcc("libstdc++11").with_compiler_version("9")).unwrap();
        assert_eq!(value(&params, "cc-min-version"), Some("9.0"));

        let params = translate(&gcc("libstdc++11").with_compiler_version("9.3")).unwrap();
        assert_eq!(value(&params, "cc-min-version"), Some("9.3"));

        let params = translate(&gcc("libstdc++11").with_compiler_version("10.2.1")).unwrap();
        assert_eq!(value(&params, "cc-min-version"), Some("10.2.1"));

        assert!(translate(&gcc("libstdc++11").with_compiler_version("9.")).is_err());
    }

    #[test]
    fn test_gcc_without_version_fails() {
        let settings = BuildSettings::new("Linux", "x86_64", "gcc").with_libcxx("libstdc++11");
        let err = translate(&settings).unwrap_err();
        assert!(matches!(
            err,
            RecipeError::UnsupportedSetting { ref setting, .. } if setting == "compiler.version"
        ));
    }

    #[test]
    fn test_mingw() {
        let settings = BuildSettings::new("Windows", "x86", "gcc")
            .with_compiler_version("8")
            .with_libcxx("libstdc++11");
        let params = translate(&settings).unwrap();

        assert_eq!(value(&params, "os"), Some("windows"));
        assert_eq!(value(&params, "cc"), Some("mingw"));
        assert_eq!(value(&params, "cpu"), Some("x86_32"));
        assert_eq!(value(&params, "cc-min-version"), Some("8.0"));
    }

    #[test]
    fn test_msvc_runtime_passthrough() {
        let settings = BuildSettings::new("Windows", "x86_64", "Visual Studio")
            .with_compiler_version("15")
            .with_runtime("MTd")
            .with_build_type("Debug")
            .with_shared(false);
        let params = translate(&settings).unwrap();

        assert_eq!(
            to_args(&params),
            vec![
                "--os=windows",
                "--cc=msvc",
                "--cpu=x86_64",
                "--msvc-runtime=MTd",
                "--debug-mode",
                "--enable-static-library",
                "--disable-shared-library",
            ]
        );
    }

    #[test]
    fn test_msvc_without_runtime_fails() {
        let settings = BuildSettings::new("Windows", "x86_64", "Visual Studio");
        assert!(matches!(
            translate(&settings),
            Err(RecipeError::UnsupportedSetting { .. })
        ));
    }

    #[test]
    fn test_clang_has_no_extras() {
        let settings = BuildSettings::new("Linux", "x86_64", "clang")
            .with_compiler_version("10")
            .with_libcxx("libstdc++11");
        let params = translate(&settings).unwrap();
        assert_eq!(
            keys(&params),
            vec!["os", "cc", "cpu", "enable-shared-library", "disable-static-library"]
        );
    }

    #[test]
    fn test_link_mode_pair_is_exclusive() {
        for shared in [true, false] {
            let params = translate(&gcc("libstdc++11").with_shared(shared)).unwrap();
            let link: Vec<&str> = params
                .iter()
                .filter(|p| p.key.ends_with("-library"))
                .map(|p| p.key.as_str())
                .collect();

            if shared {
                assert_eq!(link, vec!["enable-shared-library", "disable-static-library"]);
            } else {
                assert_eq!(link, vec!["enable-static-library", "disable-shared-library"]);
            }
        }
    }

    #[test]
    fn test_debug_flag_only_for_debug() {
        for build_type in ["Release", "RelWithDebInfo", "MinSizeRel"] {
            let params = translate(&gcc("libstdc++11").with_build_type(build_type)).unwrap();
            assert!(!keys(&params).contains(&"debug-mode".to_string()));
        }

        let params = translate(&gcc("libstdc++11").with_build_type("Debug")).unwrap();
        let debug = params.iter().find(|p| p.key == "debug-mode").unwrap();
        assert_eq!(debug.value, None);
    }

    #[test]
    fn test_supported_combinations_have_single_core_params() {
        let combos = [
            ("Linux", "gcc"),
            ("Linux", "clang"),
            ("Linux", "apple-clang"),
            ("Windows", "gcc"),
            ("Windows", "clang"),
            ("Windows", "Visual Studio"),
        ];

        for (os, compiler) in combos {
            for arch in ["x86", "x86_64"] {
                let settings = BuildSettings::new(os, arch, compiler)
                    .with_compiler_version("9")
                    .with_libcxx("libstdc++11")
                    .with_runtime("MD");
                let params = translate(&settings).unwrap();

                for key in ["os", "cc", "cpu"] {
                    assert_eq!(params.iter().filter(|p| p.key == key).count(), 1);
                }

                let unique: HashSet<&String> = params.iter().map(|p| &p.key).collect();
                assert_eq!(unique.len(), params.len(), "duplicate key for {} {}", os, compiler);
            }
        }
    }

    #[test]
    fn test_unsupported_arch_fails() {
        let settings = gcc("libstdc++11");
        let settings = BuildSettings {
            arch: "armv8".to_string(),
            ..settings
        };

        match translate(&settings) {
            Err(RecipeError::UnsupportedSetting { setting, value }) => {
                assert_eq!(setting, "arch");
                assert_eq!(value, "armv8");
            }
            other => panic!("expected UnsupportedSetting, got {:?}", other),
        }
    }
}
