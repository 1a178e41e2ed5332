//! CLI command-name contract for logging.

use crate::cli::parse::Commands;

/// Command name used as a log field (e.g. "check", "solve").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Check { .. } => "check",
        Commands::Solve { .. } => "solve",
        Commands::Config => "config",
    }
}
