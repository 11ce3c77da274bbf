//! CLI command handlers.

mod compare;
mod config;
mod listmerge;
mod ooo;
mod pull;
mod reading_volumes;
mod sort;
mod sync;
mod volumes;

use std::path::Path;

use anyhow::{Context, Result};
use comicpull_core::{Database, JsonCatalog, PullList};

pub use compare::run_compare_command;
pub use config::run_config_show_command;
pub use listmerge::run_listmerge_command;
pub use ooo::run_ooo_command;
pub use pull::run_pull_command;
pub use reading_volumes::run_reading_volumes_command;
pub use sort::run_sort_command;
pub use sync::run_sync_command;
pub use volumes::run_volumes_command;

fn load_catalog(path: &Path) -> Result<JsonCatalog> {
    JsonCatalog::load(path)
        .with_context(|| format!("Failed to load catalog '{}'", path.display()))
}

async fn open_pull_list(path: &Path) -> Result<PullList> {
    let db = Database::new(path)
        .await
        .with_context(|| format!("Failed to open pull database '{}'", path.display()))?;
    Ok(PullList::new(db))
}
