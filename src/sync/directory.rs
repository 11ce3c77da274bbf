//! Synced directory records.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use super::SyncError;
use super::filename::parse_synced_filename;
use crate::catalog::IssueId;

/// A file in the sync directory, identified by the issue it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncedFile {
    /// Current filename, without directory.
    pub filename: String,
    /// Lowercased format extension. Never changes for the life of the record.
    pub format: String,
    /// Index prefix, when present.
    pub index: Option<f64>,
    position: usize,
}

/// In-memory view of a sync directory, keyed by issue identifier.
///
/// Removing or renaming a record acts on the physical file first; the record
/// only changes once the filesystem operation succeeded.
#[derive(Debug)]
pub struct SyncDirectory {
    root: PathBuf,
    files: BTreeMap<IssueId, SyncedFile>,
}

impl SyncDirectory {
    /// Scans `root`. Files not following the synced naming convention are
    /// ignored. When two files carry the same identifier, the first in name
    /// order wins.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Io`] if the directory cannot be listed.
    #[instrument(skip(root), fields(root = %root.as_ref().display()))]
    pub fn scan(root: impl AsRef<Path>) -> Result<Self, SyncError> {
        let root = root.as_ref().to_path_buf();
        let listing = fs::read_dir(&root).map_err(|source| SyncError::io(&root, source))?;

        let mut names = Vec::new();
        for entry in listing {
            let entry = entry.map_err(|source| SyncError::io(&root, source))?;
            if !entry.file_type().is_ok_and(|kind| kind.is_file()) {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();

        let mut files: BTreeMap<IssueId, SyncedFile> = BTreeMap::new();
        for (position, filename) in names.into_iter().enumerate() {
            let Some(parsed) = parse_synced_filename(&filename) else {
                debug!(%filename, "Ignoring unrecognized file");
                continue;
            };
            if let Some(existing) = files.get(&parsed.id) {
                warn!(
                    id = parsed.id,
                    kept = %existing.filename,
                    ignored = %filename,
                    "Duplicate issue in sync directory"
                );
                continue;
            }
            files.insert(
                parsed.id,
                SyncedFile {
                    filename,
                    format: parsed.format,
                    index: parsed.index,
                    position,
                },
            );
        }
        debug!(files = files.len(), "Scanned sync directory");
        Ok(Self { root, files })
    }

    /// Re-reads the directory from disk.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Io`] if the directory cannot be listed.
    pub fn rescan(&mut self) -> Result<(), SyncError> {
        *self = Self::scan(&self.root)?;
        Ok(())
    }

    /// Returns the directory path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the record for an issue.
    #[must_use]
    pub fn get(&self, id: IssueId) -> Option<&SyncedFile> {
        self.files.get(&id)
    }

    /// Returns true when a file for the issue is present.
    #[must_use]
    pub fn contains(&self, id: IssueId) -> bool {
        self.files.contains_key(&id)
    }

    /// Identifiers of all synced files.
    pub fn ids(&self) -> impl Iterator<Item = IssueId> + '_ {
        self.files.keys().copied()
    }

    /// Number of synced files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true when no synced files are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Every file as `(id, index)`, in scan order.
    #[must_use]
    pub fn placements(&self) -> Vec<(IssueId, Option<f64>)> {
        let mut placements: Vec<(usize, IssueId, Option<f64>)> = self
            .files
            .iter()
            .map(|(&id, file)| (file.position, id, file.index))
            .collect();
        placements.sort_by_key(|(position, _, _)| *position);
        placements
            .into_iter()
            .map(|(_, id, index)| (id, index))
            .collect()
    }

    /// Deletes the file for an issue and drops its record.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownIssue`] when no file is recorded and
    /// [`SyncError::Io`] when the file cannot be deleted.
    pub fn remove(&mut self, id: IssueId) -> Result<(), SyncError> {
        let file = self.files.get(&id).ok_or(SyncError::UnknownIssue(id))?;
        let path = self.root.join(&file.filename);
        fs::remove_file(&path).map_err(|source| SyncError::io(&path, source))?;
        debug!(id, path = %path.display(), "Removed synced file");
        self.files.remove(&id);
        Ok(())
    }

    /// Renames the file for an issue.
    ///
    /// The new name must embed the same identifier and format as the current
    /// one. Renaming to the current name is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownIssue`], [`SyncError::InvalidFilename`],
    /// [`SyncError::IdentifierMismatch`] or [`SyncError::FormatChange`] when
    /// the rename is not allowed, and [`SyncError::Io`] when it fails on disk.
    pub fn rename(&mut self, id: IssueId, new_filename: &str) -> Result<(), SyncError> {
        let file = self.files.get(&id).ok_or(SyncError::UnknownIssue(id))?;
        let parsed = parse_synced_filename(new_filename)
            .ok_or_else(|| SyncError::InvalidFilename(new_filename.to_string()))?;
        if parsed.id != id {
            return Err(SyncError::IdentifierMismatch {
                expected: id,
                found: parsed.id,
                filename: new_filename.to_string(),
            });
        }
        if parsed.format != file.format {
            return Err(SyncError::FormatChange {
                id,
                from: file.format.clone(),
                to: parsed.format,
            });
        }
        if file.filename == new_filename {
            return Ok(());
        }

        let from = self.root.join(&file.filename);
        let to = self.root.join(new_filename);
        fs::rename(&from, &to).map_err(|source| SyncError::io(&from, source))?;
        debug!(id, from = %file.filename, to = %new_filename, "Renamed synced file");

        if let Some(file) = self.files.get_mut(&id) {
            file.filename = new_filename.to_string();
            file.index = parsed.index;
        }
        Ok(())
    }
}
