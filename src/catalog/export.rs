//! Copying issue files out of the library into a sync directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{IssueId, IssueMetadata, MetadataSource};
use crate::sync::filename::{SYNC_FORMATS, parse_synced_filename, sanitize_filename, sync_format};

/// Places issue files into a target directory.
pub trait Exporter {
    /// Exports each issue into `target`, named `<title> (<id>).<format>`.
    ///
    /// Returns the identifiers that could not be exported. Failures are not
    /// fatal to the batch.
    fn export(&self, ids: &[IssueId], target: &Path) -> BTreeSet<IssueId>;
}

/// Name an exported file receives before the reindexer positions it.
///
/// A title that starts like an index prefix (`"1985 Special"`) gets a leading
/// `_` so the file reads back as unindexed.
#[must_use]
pub fn exported_filename(title: &str, id: IssueId, format: &str) -> String {
    let name = sanitize_filename(&format!("{title} ({id}).{format}"));
    if parse_synced_filename(&name).is_some_and(|parsed| parsed.index.is_some()) {
        return format!("_{name}");
    }
    name
}

/// Exporter that copies the best available format of each issue from the
/// library, as listed in the catalog.
pub struct CatalogExporter<'a> {
    source: &'a dyn MetadataSource,
}

impl<'a> CatalogExporter<'a> {
    /// Creates an exporter over a metadata source.
    #[must_use]
    pub fn new(source: &'a dyn MetadataSource) -> Self {
        Self { source }
    }

    fn export_one(&self, id: IssueId, target: &Path) -> bool {
        let Some(issue) = self.source.lookup(id) else {
            warn!(id, "Cannot export issue missing from catalog");
            return false;
        };
        let Some((file, format)) = preferred_file(&issue) else {
            warn!(id, title = %issue.title, "Issue has no file in a supported format");
            return false;
        };

        let destination = target.join(exported_filename(&issue.title, id, format));
        match fs::copy(file, &destination) {
            Ok(bytes) => {
                debug!(id, to = %destination.display(), bytes, "Exported issue");
                true
            }
            Err(err) => {
                warn!(id, from = %file.display(), error = %err, "Export failed");
                false
            }
        }
    }
}

impl Exporter for CatalogExporter<'_> {
    fn export(&self, ids: &[IssueId], target: &Path) -> BTreeSet<IssueId> {
        ids.iter()
            .copied()
            .filter(|&id| !self.export_one(id, target))
            .collect()
    }
}

fn preferred_file(issue: &IssueMetadata) -> Option<(&PathBuf, &'static str)> {
    let candidates: Vec<(&PathBuf, &'static str)> = issue
        .files
        .iter()
        .filter_map(|file| {
            let ext = file.extension()?.to_str()?;
            sync_format(ext).map(|format| (file, format))
        })
        .collect();
    SYNC_FORMATS.iter().find_map(|wanted| {
        candidates
            .iter()
            .find(|(_, format)| format == wanted)
            .copied()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::JsonCatalog;
    use tempfile::TempDir;

    fn issue(id: IssueId, title: &str, files: Vec<PathBuf>) -> IssueMetadata {
        IssueMetadata {
            id,
            title: title.to_string(),
            title_sort: None,
            series: None,
            issue_number: None,
            publisher: None,
            volume: None,
            comicvine_id: None,
            pubdate: None,
            files,
        }
    }

    #[test]
    fn test_exported_filename_sanitizes() {
        assert_eq!(exported_filename("Foo: Bar", 5, "cbz"), "Foo_ Bar (5).cbz");
    }

    #[test]
    fn test_exported_filename_never_reads_as_indexed() {
        let name = exported_filename("1985 Special", 7, "cbz");
        assert_eq!(name, "_1985 Special (7).cbz");
        let parsed = parse_synced_filename(&name).unwrap();
        assert_eq!(parsed.id, 7);
        assert_eq!(parsed.index, None);

        assert_eq!(exported_filename("1602 #1", 8, "cbr"), "_1602 #1 (8).cbr");
        assert_eq!(exported_filename("300 #1", 9, "cbz"), "300 #1 (9).cbz");
    }

    #[test]
    fn test_export_copies_preferred_format() {
        let library = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let pdf = library.path().join("foo.pdf");
        let cbz = library.path().join("foo.cbz");
        fs::write(&pdf, b"pdf").unwrap();
        fs::write(&cbz, b"cbz").unwrap();

        let catalog = JsonCatalog::from_issues(vec![issue(55, "Foo #1", vec![pdf, cbz])]).unwrap();
        let failed = CatalogExporter::new(&catalog).export(&[55], target.path());

        assert!(failed.is_empty());
        let copied = target.path().join("Foo #1 (55).cbz");
        assert_eq!(fs::read(copied).unwrap(), b"cbz");
    }

    #[test]
    fn test_export_reports_failures() {
        let target = TempDir::new().unwrap();
        let catalog = JsonCatalog::from_issues(vec![
            issue(1, "Missing file", vec![PathBuf::from("/nonexistent/a.cbz")]),
            issue(2, "Wrong format", vec![PathBuf::from("/nonexistent/a.jpg")]),
        ])
        .unwrap();

        let failed = CatalogExporter::new(&catalog).export(&[1, 2, 3], target.path());
        assert_eq!(failed, BTreeSet::from([1, 2, 3]));
    }
}
