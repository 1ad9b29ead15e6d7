//! CLI command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string for structured logs (e.g. "run", "check").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Run(_) => "run",
        Commands::Assemble { .. } => "assemble",
        Commands::Check { .. } => "check",
        Commands::Extract { .. } => "extract",
        Commands::Config => "config",
    }
}
