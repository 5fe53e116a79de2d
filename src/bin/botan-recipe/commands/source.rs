//! `botan-recipe source` command

use anyhow::Result;

use crate::cli::SourceArgs;
use botan_recipe::ops::{self, SourceSpec};
use botan_recipe::util::GlobalContext;

pub fn execute(args: SourceArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = ctx.load_config()?;

    let spec = SourceSpec::Git {
        url: args.url.unwrap_or_else(|| config.repository_url().to_string()),
        tag: args.tag.unwrap_or_else(|| config.library_version().to_string()),
    };
    let dest = ctx.resolve(&args.dest);

    ops::source(&spec, &dest)?;

    eprintln!("    Fetched source into {}", dest.display());
    Ok(())
}
