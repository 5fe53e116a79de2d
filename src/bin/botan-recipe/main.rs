//! botan-recipe CLI - build and package the Botan cryptography library

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use botan_recipe::util::diagnostic;
use botan_recipe::RecipeError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<RecipeError>() {
            Some(err) => diagnostic::emit(&err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("botan_recipe=debug")
    } else {
        EnvFilter::new("botan_recipe=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(args),
        Commands::Source(args) => commands::source::execute(args),
        Commands::Args(args) => commands::args::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::TestPackage(args) => commands::test_package::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
