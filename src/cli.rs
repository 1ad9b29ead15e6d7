//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, RunArgs};
pub use presentation::{
    format_preflight_json, format_preflight_text, format_run_json, format_run_review_text,
    format_section_heading, preview,
};
pub use route::{build_generation_request, load_items, load_run, RunContext};
