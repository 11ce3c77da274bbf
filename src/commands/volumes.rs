//! Volumes command handlers: list, follow, unfollow and expire pulled volumes.

use anyhow::{Result, bail};
use chrono::{Datelike, Local};
use comicpull_core::{ExpiredVolume, MetadataSource, PullList, PulledVolume};
use tracing::info;

use super::pull::follow_volumes;
use super::{load_catalog, open_pull_list};
use crate::app::config_runtime::Settings;
use crate::cli::{VolumesArgs, VolumesCommand};

pub async fn run_volumes_command(args: &VolumesArgs, settings: &Settings) -> Result<()> {
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
    let source = catalog.as_ref().map(|c| c as &dyn MetadataSource);
    let pull_list = open_pull_list(&pulldb).await?;

    match &args.command {
        VolumesCommand::List => {
            for volume in pull_list.pulled_volumes().await? {
                println!("{}", volume_line(&volume, source));
            }
        }
        VolumesCommand::Add { volumes } => {
            info!(volumes = volumes.len(), "Adding volumes");
            let added = follow_volumes(&pull_list, volumes, source).await?;
            info!(added, "Volumes added");
        }
        VolumesCommand::Remove { volumes } => {
            info!(volumes = volumes.len(), "Removing volumes");
            for &volume in volumes {
                pull_list.remove_volume(volume).await?;
            }
        }
        VolumesCommand::Expire { days } => {
            let Some(source) = source else {
                bail!(
                    "No catalog given\n  Suggestion: Pass --catalog or set `catalog` in the config file"
                );
            };
            info!(days, "Checking for volumes with no recent issues");
            let today = Local::now().date_naive();
            for expired in pull_list.expired_volumes(source, today, *days).await? {
                println!("{}", expired_line(&expired));
            }
        }
    }

    pull_list.close().await;
    Ok(())
}

/// `<id> - <name> (<start year>)`, preferring the cached name.
fn volume_line(volume: &PulledVolume, source: Option<&dyn MetadataSource>) -> String {
    let info = source.and_then(|source| source.volume(volume.volume));
    let name = volume
        .name
        .clone()
        .or_else(|| info.as_ref().map(|info| info.name.clone()))
        .unwrap_or_else(|| "<unknown>".to_string());
    let year = volume
        .start_date
        .map(|date| date.year())
        .or_else(|| info.and_then(|info| info.start_year));
    match year {
        Some(year) => format!("{} - {name} ({year})", volume.volume),
        None => format!("{} - {name}", volume.volume),
    }
}

fn expired_line(expired: &ExpiredVolume) -> String {
    let name = expired.name.as_deref().unwrap_or("<unknown>");
    match expired.last_issue {
        Some(date) => format!("{} - {name}: last issue {date}", expired.volume),
        None => format!("{} - {name}: no dated issues", expired.volume),
    }
}
