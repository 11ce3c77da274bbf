//! Reading-volumes command handler.

use anyhow::Result;
use comicpull_core::ReadingList;

use super::load_catalog;
use crate::app::config_runtime::Settings;
use crate::cli::ReadingVolumesArgs;

pub fn run_reading_volumes_command(args: &ReadingVolumesArgs, settings: &Settings) -> Result<()> {
    let todo_file = Settings::require(
        args.todo_file.as_ref(),
        settings.todo_file.as_ref(),
        "--todo-file",
        "todo_file",
    )?;
    let catalog_path = Settings::require(
        args.catalog.as_ref(),
        settings.catalog.as_ref(),
        "--catalog",
        "catalog",
    )?;
    let catalog = load_catalog(&catalog_path)?;

    for (volume, series) in ReadingList::new(todo_file).volumes(&catalog)? {
        println!("{volume}: {series}");
    }
    Ok(())
}
