//! Merges command-line values, the config file and built-in defaults.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{ArgMatches, CommandFactory, FromArgMatches, parser::ValueSource};
use comicpull_core::DEFAULT_SPARSE_INTERVAL;

use crate::app_config::{FileConfig, VerbositySetting, home_dir};
use crate::cli::Cli;

/// Issues kept on the device when neither `-n` nor `sync_count` is given.
pub(crate) const DEFAULT_SYNC_COUNT: u64 = 50;

const DEFAULT_PULLDB_NAME: &str = ".pull.db";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CliValueSources {
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
}

/// Defaults every command falls back to when its own flag is absent.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Settings {
    pub(crate) todo_file: Option<PathBuf>,
    pub(crate) pulldb: Option<PathBuf>,
    pub(crate) catalog: Option<PathBuf>,
    pub(crate) sync_dir: Option<PathBuf>,
    pub(crate) sync_count: u64,
    pub(crate) sparse_interval: f64,
    pub(crate) catchup_streams: Vec<String>,
    pub(crate) publishers: Vec<String>,
    pub(crate) verbosity: VerbositySetting,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            todo_file: None,
            pulldb: home_dir().map(|home| home.join(DEFAULT_PULLDB_NAME)),
            catalog: None,
            sync_dir: None,
            sync_count: DEFAULT_SYNC_COUNT,
            sparse_interval: DEFAULT_SPARSE_INTERVAL,
            catchup_streams: Vec::new(),
            publishers: Vec::new(),
            verbosity: VerbositySetting::Default,
        }
    }
}

impl Settings {
    /// Picks the command-line value, then the configured one, or fails
    /// naming both ways to supply it.
    pub(crate) fn require(
        cli_value: Option<&PathBuf>,
        configured: Option<&PathBuf>,
        flag: &str,
        key: &str,
    ) -> Result<PathBuf> {
        match cli_value.or(configured) {
            Some(path) => Ok(path.clone()),
            None => bail!(
                "No {key} given\n  Suggestion: Pass {flag} or set `{key}` in the config file"
            ),
        }
    }
}

pub(crate) fn parse_cli_with_sources() -> (Cli, CliValueSources) {
    let command = Cli::command();
    let matches = command.get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    let sources = sources_from_matches(&matches);
    (cli, sources)
}

fn sources_from_matches(matches: &ArgMatches) -> CliValueSources {
    CliValueSources {
        verbose: is_commandline_value(matches, "verbose"),
        quiet: is_commandline_value(matches, "quiet"),
    }
}

/// Global flags may be given at any subcommand depth.
fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
        || matches
            .subcommand()
            .is_some_and(|(_, sub)| is_commandline_value(sub, id))
}

/// Applies the config file over the built-in defaults.
pub(crate) fn resolve_settings(file_config: Option<&FileConfig>) -> Settings {
    let mut settings = Settings::default();
    let Some(file_config) = file_config else {
        return settings;
    };

    if let Some(todo_file) = &file_config.todo_file {
        settings.todo_file = Some(todo_file.clone());
    }
    if let Some(pulldb) = &file_config.pulldb {
        settings.pulldb = Some(pulldb.clone());
    }
    if let Some(catalog) = &file_config.catalog {
        settings.catalog = Some(catalog.clone());
    }
    if let Some(sync_dir) = &file_config.sync_dir {
        settings.sync_dir = Some(sync_dir.clone());
    }
    if let Some(sync_count) = file_config.sync_count {
        settings.sync_count = sync_count;
    }
    if let Some(sparse_interval) = file_config.sparse_interval {
        settings.sparse_interval = sparse_interval;
    }
    if let Some(verbosity) = file_config.verbosity {
        settings.verbosity = verbosity;
    }
    settings
        .catchup_streams
        .clone_from(&file_config.catchup_streams);
    settings.publishers.clone_from(&file_config.publishers);
    settings
}

/// Log level from `-v`/`-q`, falling back to the configured verbosity.
pub(crate) fn resolve_default_log_level(
    verbose: u8,
    quiet: bool,
    cli_sources: &CliValueSources,
    configured: VerbositySetting,
) -> &'static str {
    if should_force_cli_log_level(cli_sources) {
        if quiet {
            return "error";
        }
        return match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
    }
    match configured {
        VerbositySetting::Quiet => "error",
        VerbositySetting::Default => "info",
        VerbositySetting::Verbose => "debug",
        VerbositySetting::Debug => "trace",
    }
}

pub(crate) fn should_force_cli_log_level(cli_sources: &CliValueSources) -> bool {
    cli_sources.verbose || cli_sources.quiet
}

/// Quiet output is requested on the command line or, absent `-v`, by config.
pub(crate) fn is_quiet(quiet: bool, cli_sources: &CliValueSources, settings: &Settings) -> bool {
    quiet || (!cli_sources.verbose && settings.verbosity == VerbositySetting::Quiet)
}
