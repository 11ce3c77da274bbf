//! Error types for catalog loading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the catalog document.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error(
        "failed to read catalog '{path}': {source}\n  Suggestion: Pass the library export with --catalog or set `catalog` in the config file"
    )]
    Read {
        /// Catalog path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// The catalog file is not a valid catalog document.
    #[error("invalid catalog '{path}': {source}")]
    Parse {
        /// Catalog path
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Two catalog records share an identifier.
    #[error("catalog '{path}' lists issue {id} more than once")]
    DuplicateIssue {
        /// Catalog path
        path: PathBuf,
        /// Repeated identifier
        id: i64,
    },
}
