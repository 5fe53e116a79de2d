//! `botan-recipe build` command

use std::io::IsTerminal;

use anyhow::Result;

use crate::cli::BuildArgs;
use crate::commands::resolve_settings;
use botan_recipe::core::LibraryKind;
use botan_recipe::ops::{self, BuildOptions, SourceSpec};
use botan_recipe::util::diagnostic::{self, Diagnostic};
use botan_recipe::util::GlobalContext;

pub fn execute(args: BuildArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;

    // Load configuration (global + project)
    let config = ctx.load_config()?;

    let settings = resolve_settings(&args.settings)?;

    let source = match args.source_dir {
        Some(ref dir) => SourceSpec::Path(ctx.resolve(dir)),
        None => SourceSpec::Git {
            url: config.repository_url().to_string(),
            tag: config.library_version().to_string(),
        },
    };

    // Jobs: CLI > config > None (auto-detect)
    let mut tools = config.tools.clone();
    tools.jobs = args.jobs.or(tools.jobs);

    let opts = BuildOptions {
        source,
        version: config.library_version().to_string(),
        work_dir: args
            .work_dir
            .as_deref()
            .map(|p| ctx.resolve(p))
            .unwrap_or_else(|| ctx.work_dir(&config)),
        package_root: ctx.package_root(&config),
        package_dir: args.package_dir.as_deref().map(|p| ctx.resolve(p)),
        tools,
    };

    let result = ops::build(&settings, &opts)?;

    if result.target.link_mode.is_shared()
        && result.artifacts.libraries_of(LibraryKind::Shared).next().is_none()
    {
        diagnostic::emit(
            &Diagnostic::warning("shared build produced no shared library")
                .with_location(result.package_dir.clone()),
            std::io::stderr().is_terminal(),
        );
    }

    eprintln!(
        "    Finished botan {} ({}) -> {}",
        opts.version,
        result.target,
        result.package_dir.display()
    );

    Ok(())
}
