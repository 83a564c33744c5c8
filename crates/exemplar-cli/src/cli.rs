use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use exemplar_core::OutputFormat;

/// Command-line arguments for the exemplar harness
#[derive(Debug, Parser)]
#[command(name = "exemplar", version)]
#[command(about = "Run reflective identity expectations from fixture files", long_about = None)]
pub struct Cli {
    /// Harness configuration file
    #[arg(short, long, global = true, default_value = "exemplar.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Harness subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load and evaluate fixtures, exiting non-zero unless everything passes
    Run(RunArgs),
    /// List discovered fixture files
    List(ListArgs),
}

/// Arguments for `exemplar run`
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Fixture files or directories [default: `fixtures_dir` from config]
    pub paths: Vec<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Maximum number of fixture files evaluated at once
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Re-raise producer panics, aborting the run, instead of reporting them as fixture errors
    #[arg(long)]
    pub no_catch_panics: bool,
}

/// Arguments for `exemplar list`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Fixture files or directories [default: `fixtures_dir` from config]
    pub paths: Vec<PathBuf>,
}

/// Report format flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Human-readable lines
    Text,
    /// Pretty-printed JSON
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}
