//! Command implementations

pub mod args;
pub mod build;
pub mod completions;
pub mod info;
pub mod source;
pub mod test_package;

use anyhow::Result;

use crate::cli::SettingsArgs;
use botan_recipe::core::{BuildSettings, Profile};
use botan_recipe::util::diagnostic::suggestions;

/// Host settings, then the profile, then `-s` / `-o` overrides.
pub fn resolve_settings(args: &SettingsArgs) -> Result<BuildSettings> {
    let mut settings = BuildSettings::detect_host();

    if let Some(ref path) = args.profile {
        let profile = Profile::load(path)
            .map_err(|e| anyhow::anyhow!("{:#}\n{}", e, suggestions::BAD_PROFILE))?;
        profile.apply(&mut settings);
    }

    settings.apply_assignments(
        args.settings.iter().map(String::as_str),
        args.options.iter().map(String::as_str),
    )?;

    Ok(settings)
}
