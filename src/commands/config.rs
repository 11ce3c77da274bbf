//! Config command handlers: show effective configuration.

use std::path::PathBuf;

use anyhow::Result;

use crate::app::config_runtime::Settings;
use crate::app_config::LoadedConfig;

pub fn run_config_show_command(loaded_config: &LoadedConfig, settings: &Settings) -> Result<()> {
    let resolved_path = loaded_config.path.as_ref().map_or_else(
        || "<unresolved>".to_string(),
        |path| path.display().to_string(),
    );
    println!("config_path = {resolved_path}");
    println!(
        "config_file = {}",
        if loaded_config.loaded_from_file {
            "loaded"
        } else {
            "not found (using defaults)"
        }
    );
    println!("todo_file = {}", display_path(settings.todo_file.as_ref()));
    println!("pulldb = {}", display_path(settings.pulldb.as_ref()));
    println!("catalog = {}", display_path(settings.catalog.as_ref()));
    println!("sync_dir = {}", display_path(settings.sync_dir.as_ref()));
    println!("sync_count = {}", settings.sync_count);
    println!("sparse_interval = {}", settings.sparse_interval);
    println!("verbosity = {}", settings.verbosity.as_str());
    for spec in &settings.catchup_streams {
        println!("catchup_stream = {spec}");
    }
    for spec in &settings.publishers {
        println!("publisher = {spec}");
    }

    Ok(())
}

fn display_path(path: Option<&PathBuf>) -> String {
    path.map_or_else(|| "<unset>".to_string(), |path| path.display().to_string())
}
