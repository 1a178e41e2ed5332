//! CLI parse: clap types for Scout. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scout CLI - check constraint sets and explore solver layouts
#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "Check UI constraint sets against a layout solver and explore its designs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Solver base URL (overrides configuration)
    #[arg(long)]
    pub solver_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask the solver whether a canvas file is satisfiable
    Check {
        /// Canvas file: a JSON shape array or {"shapes": [...], "geometry": {...}}
        shapes: PathBuf,
    },
    /// Fetch solutions for a canvas file
    Solve {
        /// Canvas file: a JSON shape array or {"shapes": [...], "geometry": {...}}
        shapes: PathBuf,
        /// Number of fetch-more rounds
        #[arg(long, default_value_t = 1)]
        rounds: usize,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the effective configuration as TOML
    Config,
}
