//! Library catalog access.
//!
//! The catalog is an external collaborator: a read-only export of the comic
//! library's metadata. The core algorithms only see it through two narrow
//! traits:
//! - [`MetadataSource`] - issue lookup by identifier and by volume
//! - [`Exporter`] - copies issue files into a sync directory
//!
//! [`JsonCatalog`] and [`CatalogExporter`] are the file-backed implementations
//! used by the CLI.

mod error;
mod export;
mod json;

pub use error::CatalogError;
pub use export::{CatalogExporter, Exporter, exported_filename};
pub use json::JsonCatalog;

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

/// Catalog identifier of an issue.
pub type IssueId = i64;

/// Identifier of a volume (series run) in the metadata database.
pub type VolumeId = i64;

/// Metadata for a single issue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueMetadata {
    /// Catalog identifier.
    pub id: IssueId,
    /// Display title, e.g. `Foo #1`.
    pub title: String,
    /// Title used for sorting; falls back to `title` when absent.
    #[serde(default)]
    pub title_sort: Option<String>,
    /// Series name.
    #[serde(default)]
    pub series: Option<String>,
    /// Issue number as printed.
    #[serde(default)]
    pub issue_number: Option<String>,
    /// Publisher name, matched verbatim against publisher rules.
    #[serde(default)]
    pub publisher: Option<String>,
    /// Volume identifier, used by catchup rules and the pull list.
    #[serde(default)]
    pub volume: Option<VolumeId>,
    /// Identifier of the issue in the metadata database.
    #[serde(default)]
    pub comicvine_id: Option<i64>,
    /// Publication (store) date.
    #[serde(default)]
    pub pubdate: Option<NaiveDate>,
    /// Book files for this issue, one per format.
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

impl IssueMetadata {
    /// Returns the title used as the secondary sort key.
    #[must_use]
    pub fn sort_title(&self) -> &str {
        self.title_sort.as_deref().unwrap_or(&self.title)
    }
}

/// Summary of a volume derived from its issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    /// Volume identifier.
    pub id: VolumeId,
    /// Series name.
    pub name: String,
    /// Year of the earliest dated issue.
    pub start_year: Option<i32>,
}

impl VolumeInfo {
    /// January 1st of the start year.
    #[must_use]
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_year
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
    }
}

/// Issue metadata lookup.
pub trait MetadataSource {
    /// Returns the issue with the given identifier, or `None` when unknown.
    fn lookup(&self, id: IssueId) -> Option<IssueMetadata>;

    /// Returns every issue belonging to a volume, in publication order.
    fn issues_in_volume(&self, volume: VolumeId) -> Vec<IssueMetadata>;

    /// Derives a volume summary from its issues.
    fn volume(&self, volume: VolumeId) -> Option<VolumeInfo> {
        let issues = self.issues_in_volume(volume);
        let first = issues.first()?;
        let name = first
            .series
            .clone()
            .unwrap_or_else(|| first.title.clone());
        let start_year = issues
            .iter()
            .filter_map(|issue| issue.pubdate)
            .min()
            .map(|date| date.year());
        Some(VolumeInfo {
            id: volume,
            name,
            start_year,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Fixed(Vec<IssueMetadata>);

    impl MetadataSource for Fixed {
        fn lookup(&self, id: IssueId) -> Option<IssueMetadata> {
            self.0.iter().find(|issue| issue.id == id).cloned()
        }

        fn issues_in_volume(&self, volume: VolumeId) -> Vec<IssueMetadata> {
            self.0
                .iter()
                .filter(|issue| issue.volume == Some(volume))
                .cloned()
                .collect()
        }
    }

    fn issue(id: IssueId, date: Option<&str>) -> IssueMetadata {
        IssueMetadata {
            id,
            title: format!("Foo #{id}"),
            title_sort: None,
            series: Some("Foo".to_string()),
            issue_number: Some(id.to_string()),
            publisher: None,
            volume: Some(7),
            comicvine_id: None,
            pubdate: date.map(|d| d.parse().unwrap()),
            files: Vec::new(),
        }
    }

    #[test]
    fn test_sort_title_falls_back_to_title() {
        let mut meta = issue(1, None);
        assert_eq!(meta.sort_title(), "Foo #1");
        meta.title_sort = Some("Foo 001".to_string());
        assert_eq!(meta.sort_title(), "Foo 001");
    }

    #[test]
    fn test_volume_uses_earliest_dated_issue() {
        let source = Fixed(vec![
            issue(2, Some("2014-02-01")),
            issue(1, None),
            issue(3, Some("2013-11-20")),
        ]);
        let info = source.volume(7).unwrap();
        assert_eq!(info.name, "Foo");
        assert_eq!(info.start_year, Some(2013));
        assert_eq!(info.start_date(), NaiveDate::from_ymd_opt(2013, 1, 1));
    }

    #[test]
    fn test_volume_unknown_is_none() {
        let source = Fixed(Vec::new());
        assert!(source.volume(7).is_none());
    }
}
