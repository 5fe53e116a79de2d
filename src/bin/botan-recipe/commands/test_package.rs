//! `botan-recipe test-package` command

use anyhow::Result;

use crate::cli::TestPackageArgs;
use botan_recipe::ops::{self, TestPackageOptions};
use botan_recipe::util::GlobalContext;

pub fn execute(args: TestPackageArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = ctx.load_config()?;

    let opts = TestPackageOptions {
        package_dir: ctx.resolve(&args.package_dir),
        source: args.source.as_deref().map(|p| ctx.resolve(p)),
        compiler: args.compiler,
        tools: config.tools,
    };

    let result = ops::test_package(&opts)?;

    print!("{}", result.stdout);
    eprintln!("    Finished test package in {}", opts.package_dir.display());

    Ok(())
}
