//! Merge rules: defaults first, then files, then environment.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with the solver and logging defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("solver.base_url", "http://127.0.0.1:5000")?
        .set_default("solver.validate_path", "/check")?
        .set_default("solver.generate_path", "/solve")?
        .set_default("solver.connect_timeout_secs", 10)?
        .set_default("solver.request_timeout_secs", 120)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
