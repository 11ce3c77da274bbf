//! Pull command handler: follow volumes and queue their new issues.

use anyhow::{Result, bail};
use comicpull_core::{MetadataSource, PullList, ReadingList, VolumeId};
use tracing::info;

use super::{load_catalog, open_pull_list};
use crate::app::config_runtime::Settings;
use crate::cli::PullArgs;

pub async fn run_pull_command(args: &PullArgs, settings: &Settings) -> Result<()> {
    let pulldb = Settings::require(
        args.pulldb.as_ref(),
        settings.pulldb.as_ref(),
        "--pulldb",
        "pulldb",
    )?;
    let catalog = match args.catalog.as_ref().or(settings.catalog.as_ref()) {
        Some(path) => Some(load_catalog(path)?),
        None => None,
    };
    let pull_list = open_pull_list(&pulldb).await?;

    follow_volumes(
        &pull_list,
        &args.add_volumes,
        catalog.as_ref().map(|c| c as &dyn MetadataSource),
    )
    .await?;

    if !args.nopull {
        let todo_file = Settings::require(
            args.todo_file.as_ref(),
            settings.todo_file.as_ref(),
            "--todo-file",
            "todo_file",
        )?;
        let Some(catalog) = &catalog else {
            bail!("No catalog given\n  Suggestion: Pass --catalog or set `catalog` in the config file");
        };
        let list = ReadingList::new(todo_file);
        let added = pull_list.pull_issues(catalog, &list).await?;
        info!(issues = added.len(), list = %list.path().display(), "Pulled new issues");
    }

    pull_list.close().await;
    Ok(())
}

/// Adds volumes not yet on the pull list, caching their names when the
/// catalog knows them.
pub(crate) async fn follow_volumes(
    pull_list: &PullList,
    volumes: &[VolumeId],
    source: Option<&dyn MetadataSource>,
) -> Result<usize> {
    let mut added = 0;
    for &volume in volumes {
        if pull_list.pull_volume(volume).await? {
            info!(volume, "Volume already followed");
            continue;
        }
        let details = source.and_then(|source| source.volume(volume));
        if pull_list.add_volume(volume, details.as_ref()).await? {
            added += 1;
        }
    }
    Ok(added)
}
