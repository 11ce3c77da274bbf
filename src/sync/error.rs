//! Error types for sync directory maintenance.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::IssueId;

/// Errors raised by sync directory operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A filesystem operation failed.
    #[error("filesystem error on '{path}': {source}")]
    Io {
        /// Path being read, renamed or removed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// No synced file is recorded for the identifier.
    #[error("no synced file for issue {0}")]
    UnknownIssue(IssueId),

    /// The proposed filename does not follow the `... (<id>).<ext>` convention.
    #[error(
        "invalid synced filename '{0}'\n  Suggestion: Synced files must end in '(<id>).<ext>' with a supported format"
    )]
    InvalidFilename(String),

    /// The proposed filename embeds a different identifier than the record.
    #[error("filename '{filename}' belongs to issue {found}, not issue {expected}")]
    IdentifierMismatch {
        /// Identifier of the record being renamed
        expected: IssueId,
        /// Identifier embedded in the proposed filename
        found: IssueId,
        /// Proposed filename
        filename: String,
    },

    /// A rename would change the file's format extension.
    #[error("refusing to change format of issue {id} from '{from}' to '{to}'")]
    FormatChange {
        /// Identifier of the record being renamed
        id: IssueId,
        /// Current format extension
        from: String,
        /// Proposed format extension
        to: String,
    },
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised when fractional indices can no longer be interpolated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReindexError {
    /// The upper bound is not above the lower bound.
    #[error("cannot place items between index {start} and {finish}: bounds are inverted")]
    InvertedBounds {
        /// Lower bound (exclusive)
        start: f64,
        /// Upper bound (exclusive)
        finish: f64,
    },

    /// The gap between the bounds is too narrow for the items.
    #[error(
        "cannot place {count} items between index {start} and {finish}: spacing {interval} is below the minimum"
    )]
    IntervalTooSmall {
        /// Lower bound (exclusive)
        start: f64,
        /// Upper bound (exclusive)
        finish: f64,
        /// Number of items to place
        count: usize,
        /// Computed spacing
        interval: f64,
    },
}
