//! CLI command routing.

use anyhow::Result;

use crate::app::config_runtime::{self, CliValueSources, Settings};
use crate::app_config::LoadedConfig;
use crate::cli::{Cli, Command, ConfigCommand};
use crate::commands;

/// Runs the handler for the parsed subcommand.
pub(crate) async fn dispatch(
    cli: &Cli,
    cli_sources: &CliValueSources,
    loaded_config: &LoadedConfig,
    settings: &Settings,
) -> Result<()> {
    let quiet = config_runtime::is_quiet(cli.quiet, cli_sources, settings);

    match &cli.command {
        Command::Sort(args) => commands::run_sort_command(args, settings),
        Command::Sync(args) => commands::run_sync_command(args, settings, quiet),
        Command::Compare(args) => commands::run_compare_command(args, quiet),
        Command::Pull(args) => commands::run_pull_command(args, settings).await,
        Command::Volumes(args) => commands::run_volumes_command(args, settings).await,
        Command::ReadingVolumes(args) => commands::run_reading_volumes_command(args, settings),
        Command::Ooo(args) => commands::run_ooo_command(args),
        Command::Listmerge(args) => commands::run_listmerge_command(args),
        Command::Config { command } => match command {
            ConfigCommand::Show => commands::run_config_show_command(loaded_config, settings),
        },
    }
}
