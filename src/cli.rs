//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; the route table dispatches to the orchestrator.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{format_check_result, format_solutions_json, format_solutions_text};
pub use route::{load_canvas, Canvas, RunContext};
