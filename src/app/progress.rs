//! Progress bar around issue export during `sync`.

use std::collections::BTreeSet;
use std::path::Path;

use comicpull_core::{Exporter, IssueId};
use indicatif::{ProgressBar, ProgressStyle};

/// Exports one issue at a time so a bar can track the batch.
pub(crate) struct ProgressExporter<'a> {
    inner: &'a dyn Exporter,
    show_bar: bool,
}

impl<'a> ProgressExporter<'a> {
    pub(crate) fn new(inner: &'a dyn Exporter, show_bar: bool) -> Self {
        Self { inner, show_bar }
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_bar {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
        bar.set_style(
            ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    }
}

impl Exporter for ProgressExporter<'_> {
    fn export(&self, ids: &[IssueId], target: &Path) -> BTreeSet<IssueId> {
        let bar = self.progress_bar(ids.len());
        let mut failed = BTreeSet::new();
        for &id in ids {
            bar.set_message(format!("Exporting issue {id}..."));
            failed.extend(self.inner.export(&[id], target));
            bar.inc(1);
        }
        bar.finish_and_clear();
        failed
    }
}
