//! `botan-recipe args` command

use anyhow::Result;

use crate::cli::SettingsArgs;
use crate::commands::resolve_settings;
use botan_recipe::ops;

pub fn execute(args: SettingsArgs) -> Result<()> {
    let settings = resolve_settings(&args)?;
    let params = ops::args(&settings)?;

    for param in &params {
        println!("{}", param.to_arg());
    }

    Ok(())
}
