//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// botan-recipe - Fetch, configure, build and package the Botan library
#[derive(Parser)]
#[command(name = "botan-recipe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch, configure, build and package the library
    Build(BuildArgs),

    /// Fetch the library source without building it
    Source(SourceArgs),

    /// Print the configure arguments for a settings combination
    Args(SettingsArgs),

    /// Print the link libraries and defines consumers need
    Info(InfoArgs),

    /// Compile and run a consumer program against a package
    TestPackage(TestPackageArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Build settings, applied on top of the detected host settings.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Settings profile (TOML)
    #[arg(long, short = 'p')]
    pub profile: Option<PathBuf>,

    /// Override a setting, e.g. `-s compiler.version=9`
    #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
    pub settings: Vec<String>,

    /// Override an option, e.g. `-o shared=False`
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Use a local source tree instead of cloning the repository
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// Root for per-settings working directories
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Exact directory to stage the package into
    #[arg(long)]
    pub package_dir: Option<PathBuf>,

    /// Number of parallel make jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct SourceArgs {
    /// Directory to place the source tree in
    #[arg(long, default_value = "botan")]
    pub dest: PathBuf,

    /// Repository URL (overrides config)
    #[arg(long)]
    pub url: Option<String>,

    /// Version tag (overrides config)
    #[arg(long)]
    pub tag: Option<String>,
}

#[derive(Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct TestPackageArgs {
    /// Package directory containing package_info.json
    pub package_dir: PathBuf,

    /// Consumer source file (defaults to the bundled example)
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// C++ compiler driver
    #[arg(long, env = "CXX")]
    pub compiler: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
