//! CLI parse: clap types for classgen. No behavior; definitions only.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// classgen CLI - batch content generation with per-item review and export
#[derive(Parser, Debug)]
#[command(name = "classgen")]
#[command(about = "Generate content for a batch of items, review it, and export one document")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Suppress progress lines and logs
    #[arg(long, default_value = "false")]
    pub quiet: bool,

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
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate content for every item in a batch input file
    Run(RunArgs),
    /// Re-assemble a saved run (after hand edits) and optionally write it out
    Assemble {
        /// Saved run file (from `run --save-run`)
        run: PathBuf,
        /// Document title for the header
        #[arg(long)]
        title: Option<String>,
        /// Tool name for the header
        #[arg(long)]
        tool: Option<String>,
        /// Write the assembled text here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Dry run: report which items would be generated or skipped
    Check {
        /// Batch input file: JSON array of {identifier, payload}
        input: PathBuf,
        /// Minimum payload text length
        #[arg(long)]
        min_length: Option<usize>,
        /// Payload field holding the item text
        #[arg(long)]
        content_field: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Print the text extracted from a file
    Extract {
        /// File to extract (.txt/.md locally, other formats via the extraction service)
        file: PathBuf,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Batch input file: JSON array of {identifier, payload}
    pub input: PathBuf,

    /// Tool name sent with every generation request
    #[arg(long)]
    pub tool: String,

    /// Document title for the export header
    #[arg(long)]
    pub title: Option<String>,

    /// Minimum payload text length (defaults to [batch].min_content_length)
    #[arg(long)]
    pub min_length: Option<usize>,

    /// Payload field holding the item text (defaults to all string fields)
    #[arg(long)]
    pub content_field: Option<String>,

    /// Write the assembled text here
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Save the full run (results and edits) as JSON for `assemble`
    #[arg(long)]
    pub save_run: Option<PathBuf>,

    /// Export through the export service and write the document here
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,
}
