//! `botan-recipe info` command

use anyhow::Result;

use crate::cli::InfoArgs;
use crate::commands::resolve_settings;
use botan_recipe::ops;
use botan_recipe::util::GlobalContext;

pub fn execute(args: InfoArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = ctx.load_config()?;

    let settings = resolve_settings(&args.settings)?;
    let info = ops::info(&settings, config.library_version())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("libs:    {}", info.libs.join(" "));
    println!("defines: {}", info.defines.join(" "));

    Ok(())
}
