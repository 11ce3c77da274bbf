//! CLI entry point for comicpull.

use anyhow::Result;
use tracing::debug;

mod app;
mod app_config;
mod cli;
mod commands;

use app::{command_dispatcher, config_runtime, terminal};
use app_config::load_default_file_config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let (cli, cli_sources) = config_runtime::parse_cli_with_sources();

    let loaded_config = load_default_file_config()?;
    let settings = config_runtime::resolve_settings(loaded_config.config.as_ref());

    let default_level = config_runtime::resolve_default_log_level(
        cli.verbose,
        cli.quiet,
        &cli_sources,
        settings.verbosity,
    );
    terminal::init_tracing(
        default_level,
        config_runtime::should_force_cli_log_level(&cli_sources),
        terminal::is_no_color_requested(),
    );
    debug!(?cli, "CLI arguments parsed");

    command_dispatcher::dispatch(&cli, &cli_sources, &loaded_config, &settings).await
}
