//! JSON catalog export backed metadata source.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use tracing::{debug, instrument};

use super::{CatalogError, IssueId, IssueMetadata, MetadataSource, VolumeId};

/// In-memory view of a catalog export document (a JSON array of issues).
#[derive(Debug, Clone, Default)]
pub struct JsonCatalog {
    issues: BTreeMap<IssueId, IssueMetadata>,
    by_volume: HashMap<VolumeId, Vec<IssueId>>,
}

impl JsonCatalog {
    /// Loads a catalog document. Relative file paths are resolved against the
    /// directory containing the document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Read`] or [`CatalogError::Parse`] when the
    /// document cannot be loaded, and [`CatalogError::DuplicateIssue`] when an
    /// identifier appears twice.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut issues: Vec<IssueMetadata> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        for issue in &mut issues {
            for file in &mut issue.files {
                if file.is_relative() {
                    *file = base.join(&*file);
                }
            }
        }

        let catalog = Self::build(path, issues)?;
        debug!(issues = catalog.len(), "Loaded catalog");
        Ok(catalog)
    }

    /// Builds a catalog from already-parsed issues.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateIssue`] when an identifier appears twice.
    pub fn from_issues(issues: Vec<IssueMetadata>) -> Result<Self, CatalogError> {
        Self::build(Path::new("<memory>"), issues)
    }

    fn build(path: &Path, issues: Vec<IssueMetadata>) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for issue in issues {
            let id = issue.id;
            if let Some(volume) = issue.volume {
                catalog.by_volume.entry(volume).or_default().push(id);
            }
            if catalog.issues.insert(id, issue).is_some() {
                return Err(CatalogError::DuplicateIssue {
                    path: path.to_path_buf(),
                    id,
                });
            }
        }
        Ok(catalog)
    }

    /// Number of issues in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Returns true when the catalog has no issues.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl MetadataSource for JsonCatalog {
    fn lookup(&self, id: IssueId) -> Option<IssueMetadata> {
        self.issues.get(&id).cloned()
    }

    fn issues_in_volume(&self, volume: VolumeId) -> Vec<IssueMetadata> {
        let mut issues: Vec<IssueMetadata> = self
            .by_volume
            .get(&volume)
            .into_iter()
            .flatten()
            .filter_map(|id| self.issues.get(id).cloned())
            .collect();
        issues.sort_by(|a, b| {
            (a.pubdate, a.sort_title(), a.id).cmp(&(b.pubdate, b.sort_title(), b.id))
        });
        issues
    }
}
