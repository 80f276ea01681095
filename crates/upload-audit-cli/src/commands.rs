use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "verify-uploads")]
#[command(about = "Audit uploaded files against the database references to them", long_about = None)]
pub struct Cli {
    /// Configuration file to load instead of ./Config.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compare database references with the uploads directory (default)
    Verify(VerifyArgs),
    /// Query each configured source and show what it contributes
    Sources,
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Default, Args)]
pub struct VerifyArgs {
    /// Print the report on a single line
    #[arg(long)]
    pub compact: bool,

    /// Also write every missing and orphaned path to a CSV file
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Number of orphaned files to list in the report
    #[arg(long, value_name = "N")]
    pub orphan_limit: Option<usize>,
}
