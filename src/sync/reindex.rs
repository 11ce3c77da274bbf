//! Incremental reindexing of a sync directory.
//!
//! The device lists files alphabetically, so the reading order is encoded in
//! an index prefix. Rather than renumbering everything when the reading list
//! changes, the reindexer keeps the longest run of files already in the right
//! relative order untouched and interpolates fractional indices for the rest.

use std::collections::{HashMap, HashSet};

use tracing::{debug, error, info, instrument, warn};

use super::filename::synced_filename;
use super::index::{INDEX_LIMIT, append_indexes, new_indexes, renumber};
use super::matcher::common_elements;
use super::{SyncDirectory, SyncError};
use crate::catalog::{Exporter, IssueId};
use crate::readlist::ReadingListEntry;

/// Index assignments for one reindex pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReindexPlan {
    /// Files whose current index already fits the desired order.
    pub stable: HashSet<IssueId>,
    /// New indices for the remaining files, in desired order.
    pub assignments: Vec<(IssueId, f64)>,
}

/// Outcome counters for a sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Files deleted because they left the reading list prefix.
    pub removed: usize,
    /// Files copied in from the library.
    pub exported: usize,
    /// Issues the exporter could not provide.
    pub export_failed: usize,
    /// Files left in place.
    pub stable: usize,
    /// Files renamed to a new index.
    pub renamed: usize,
    /// Renames that failed and were skipped.
    pub rename_failed: usize,
}

/// Computes new indices for the files in `present` so that sorting by index
/// follows `desired`.
///
/// `present` lists every synced file with its current index, in scan order.
/// Desired issues with no synced file are skipped. Unindexed files are never
/// stable, and neither are files whose index has outgrown four digits. When
/// an assignment would outgrow four digits, every file is renumbered.
#[must_use]
pub fn plan_reindex(desired: &[IssueId], present: &[(IssueId, Option<f64>)]) -> ReindexPlan {
    let mut physical: Vec<(IssueId, f64)> = present
        .iter()
        .filter_map(|&(id, index)| index.map(|index| (id, index)))
        .filter(|&(_, index)| index < INDEX_LIMIT)
        .collect();
    physical.sort_by(|a, b| a.1.total_cmp(&b.1));
    let indexes: HashMap<IssueId, f64> = physical.iter().copied().collect();
    let physical_order: Vec<IssueId> = physical.iter().map(|(id, _)| *id).collect();

    let present_ids: HashSet<IssueId> = present.iter().map(|(id, _)| *id).collect();
    let wanted: Vec<IssueId> = desired
        .iter()
        .copied()
        .filter(|id| present_ids.contains(id))
        .collect();

    let stable: HashSet<IssueId> = common_elements(&wanted, &physical_order)
        .into_iter()
        .collect();

    let mut assignments = Vec::new();
    let mut pending: Vec<IssueId> = Vec::new();
    let mut previous = 0.0;

    for (position, &id) in wanted.iter().enumerate() {
        let Some(&index) = indexes.get(&id).filter(|_| stable.contains(&id)) else {
            pending.push(id);
            continue;
        };
        match new_indexes(previous, Some(index), &pending) {
            Ok(placed) => {
                assignments.extend(placed);
                pending.clear();
                previous = index;
            }
            Err(err) => {
                error!(
                    error = %err,
                    "Index space exhausted, moving remaining files to the end"
                );
                pending.extend_from_slice(&wanted[position..]);
                assignments.extend(append_indexes(previous, &pending));
                return within_limit(
                    stable_before(&stable, &wanted[..position]),
                    assignments,
                    &wanted,
                );
            }
        }
    }
    assignments.extend(append_indexes(previous, &pending));
    within_limit(stable, assignments, &wanted)
}

/// Keeps the plan when every index still formats to four digits, otherwise
/// replaces it with a full renumbering of `wanted`.
fn within_limit(
    stable: HashSet<IssueId>,
    assignments: Vec<(IssueId, f64)>,
    wanted: &[IssueId],
) -> ReindexPlan {
    if assignments.iter().all(|&(_, index)| index < INDEX_LIMIT) {
        return ReindexPlan {
            stable,
            assignments,
        };
    }
    warn!(
        files = wanted.len(),
        "Index prefixes outgrew four digits, renumbering every file"
    );
    ReindexPlan {
        stable: HashSet::new(),
        assignments: renumber(wanted),
    }
}

fn stable_before(stable: &HashSet<IssueId>, placed: &[IssueId]) -> HashSet<IssueId> {
    placed
        .iter()
        .copied()
        .filter(|id| stable.contains(id))
        .collect()
}

/// Brings a sync directory in line with the desired reading order.
///
/// Files not in `desired` are deleted, missing issues are exported, and files
/// are renamed with index prefixes so that their alphabetical order matches
/// `desired`. Individual export and rename failures are logged and skipped.
///
/// # Errors
///
/// Returns [`SyncError::Io`] only if the directory cannot be re-read after
/// exporting.
#[instrument(skip_all, fields(root = %directory.root().display(), desired = desired.len()))]
pub fn reindex(
    directory: &mut SyncDirectory,
    desired: &[ReadingListEntry],
    exporter: &dyn Exporter,
) -> Result<SyncReport, SyncError> {
    let mut report = SyncReport::default();
    let titles: HashMap<IssueId, &str> = desired
        .iter()
        .map(|entry| (entry.id, entry.title.as_str()))
        .collect();
    let desired_ids: Vec<IssueId> = desired.iter().map(|entry| entry.id).collect();

    let unwanted: Vec<IssueId> = directory
        .ids()
        .filter(|id| !titles.contains_key(id))
        .collect();
    for id in unwanted {
        match directory.remove(id) {
            Ok(()) => report.removed += 1,
            Err(err) => warn!(id, error = %err, "Failed to remove synced file"),
        }
    }

    let missing: Vec<IssueId> = desired_ids
        .iter()
        .copied()
        .filter(|&id| !directory.contains(id))
        .collect();
    if !missing.is_empty() {
        info!(count = missing.len(), "Exporting missing issues");
        let failed = exporter.export(&missing, directory.root());
        for id in &failed {
            warn!(id, "Issue could not be exported");
        }
        report.export_failed = failed.len();
        report.exported = missing.len().saturating_sub(failed.len());
        directory.rescan()?;
    }

    let plan = plan_reindex(&desired_ids, &directory.placements());
    report.stable = plan.stable.len();
    debug!(
        stable = plan.stable.len(),
        moving = plan.assignments.len(),
        "Planned reindex"
    );

    for (id, index) in plan.assignments {
        let Some(file) = directory.get(id) else {
            continue;
        };
        let title = titles.get(&id).copied().unwrap_or_default();
        let filename = synced_filename(index, title, id, &file.format);
        if filename == file.filename {
            continue;
        }
        match directory.rename(id, &filename) {
            Ok(()) => report.renamed += 1,
            Err(err) => {
                error!(id, error = %err, "Failed to rename synced file");
                report.rename_failed += 1;
            }
        }
    }

    info!(
        removed = report.removed,
        exported = report.exported,
        renamed = report.renamed,
        stable = report.stable,
        "Sync directory updated"
    );
    Ok(report)
}
