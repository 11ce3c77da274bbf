//! Error types for reading list operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or appending to a reading list file.
#[derive(Debug, Error)]
pub enum ReadingListError {
    /// The reading list file could not be opened or read.
    #[error(
        "failed to read reading list '{path}': {source}\n  Suggestion: Check the path passed with --toread/--todo-file"
    )]
    Read {
        /// Path of the reading list
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// The reading list file could not be written.
    #[error("failed to write reading list '{path}': {source}")]
    Write {
        /// Path of the reading list
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },
}

/// A single line that does not look like `<id> <title>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to parse reading list line: '{line}'")]
pub struct LineParseError {
    /// The offending line, verbatim
    pub line: String,
}
