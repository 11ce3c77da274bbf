//! Sync command handler: mirror the head of the reading list onto a device.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use comicpull_core::{CatalogExporter, ReadingList, SyncDirectory, reindex};
use tracing::info;

use super::load_catalog;
use crate::app::config_runtime::Settings;
use crate::app::progress::ProgressExporter;
use crate::app::terminal;
use crate::cli::SyncArgs;

pub fn run_sync_command(args: &SyncArgs, settings: &Settings, quiet: bool) -> Result<()> {
    let toread = Settings::require(
        args.toread.as_ref(),
        settings.todo_file.as_ref(),
        "--toread",
        "todo_file",
    )?;
    let sync_dir = Settings::require(
        args.sync_dir.as_ref(),
        settings.sync_dir.as_ref(),
        "--sync-dir",
        "sync_dir",
    )?;
    let catalog_path = Settings::require(
        args.catalog.as_ref(),
        settings.catalog.as_ref(),
        "--catalog",
        "catalog",
    )?;
    let count = usize::try_from(args.count.unwrap_or(settings.sync_count)).unwrap_or(usize::MAX);

    let desired = ReadingList::new(&toread).prefix(count)?;
    info!(issues = desired.len(), count, "Selected issues to sync");

    let catalog = load_catalog(&catalog_path)?;
    let mut directory = SyncDirectory::scan(&sync_dir)
        .with_context(|| format!("Failed to scan sync directory '{}'", sync_dir.display()))?;

    let exporter = CatalogExporter::new(&catalog);
    let show_bar = terminal::should_use_progress(
        io::stderr().is_terminal(),
        quiet,
        terminal::is_dumb_terminal(),
    );
    let exporter = ProgressExporter::new(&exporter, show_bar);

    let report = reindex(&mut directory, &desired, &exporter)?;
    info!(
        removed = report.removed,
        exported = report.exported,
        export_failed = report.export_failed,
        stable = report.stable,
        renamed = report.renamed,
        rename_failed = report.rename_failed,
        "Sync complete"
    );
    Ok(())
}
