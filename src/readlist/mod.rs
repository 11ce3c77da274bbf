//! Reading list ("toread") file handling.
//!
//! A reading list is a UTF-8 text file with one issue per line in the form
//! `<id> <title>`, optionally followed by a ` +<stream>` tag written by the
//! merge engine. Line order is significant: it is the order issues are read
//! and the order they are placed in the sync directory.

mod error;
mod interleave;
mod ooo;

pub use error::{LineParseError, ReadingListError};
pub use interleave::interleave;
pub use ooo::{OutOfOrder, out_of_order};

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use crate::catalog::{IssueId, MetadataSource, VolumeId};

/// Result type for reading list operations.
pub type Result<T> = std::result::Result<T, ReadingListError>;

/// `<decimal id> <free text>`
#[allow(clippy::expect_used)]
static ISSUE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s+(.*)$").expect("issue line regex is valid") // Static pattern, safe to panic
});

/// Trailing ` +stream` tag appended by the merge engine.
#[allow(clippy::expect_used)]
static STREAM_TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s\+(\w+)$").expect("stream tag regex is valid") // Static pattern, safe to panic
});

/// A ` +stream` tag anywhere in a line, as left by hand edits.
#[allow(clippy::expect_used)]
static EMBEDDED_TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s\+(\w+)(?:$|\s)").expect("embedded tag regex is valid") // Static pattern, safe to panic
});

/// One parsed reading list record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingListEntry {
    /// Catalog identifier of the issue.
    pub id: IssueId,
    /// Display title, without any stream tag.
    pub title: String,
    /// Stream tag written by a previous sort, if any.
    pub stream: Option<String>,
}

impl ReadingListEntry {
    /// Creates an untagged entry.
    #[must_use]
    pub fn new(id: IssueId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            stream: None,
        }
    }

    /// Parses a `<id> <title>[ +<stream>]` line.
    ///
    /// # Errors
    ///
    /// Returns [`LineParseError`] when the line does not start with a decimal
    /// identifier followed by whitespace and a title.
    pub fn parse(line: &str) -> std::result::Result<Self, LineParseError> {
        let trimmed = line.trim_end();
        let captures = ISSUE_PATTERN.captures(trimmed).ok_or_else(|| LineParseError {
            line: line.to_string(),
        })?;
        let id = captures[1].parse::<IssueId>().map_err(|_| LineParseError {
            line: line.to_string(),
        })?;
        let text = &captures[2];

        let (title, stream) = match STREAM_TAG_PATTERN.captures(text) {
            Some(tag) => {
                let start = tag.get(0).map_or(text.len(), |m| m.start());
                (text[..start].trim_end(), Some(tag[1].to_string()))
            }
            None => (text, None),
        };

        Ok(Self {
            id,
            title: title.to_string(),
            stream,
        })
    }
}

impl fmt::Display for ReadingListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.title)?;
        if let Some(stream) = &self.stream {
            write!(f, " +{stream}")?;
        }
        Ok(())
    }
}

/// A reading list backed by a text file.
#[derive(Debug, Clone)]
pub struct ReadingList {
    path: PathBuf,
}

impl ReadingList {
    /// Creates a handle for the reading list at `path`. The file is not opened yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns every raw line of the file, in order.
    ///
    /// # Errors
    ///
    /// Returns [`ReadingListError::Read`] if the file cannot be read.
    pub fn lines(&self) -> Result<Vec<String>> {
        let raw = fs::read_to_string(&self.path).map_err(|source| ReadingListError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(raw.lines().map(str::to_string).collect())
    }

    /// Returns all parseable entries. Unparseable lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ReadingListError::Read`] if the file cannot be read.
    pub fn entries(&self) -> Result<Vec<ReadingListEntry>> {
        let mut entries = Vec::new();
        for line in self.lines()? {
            match ReadingListEntry::parse(&line) {
                Ok(entry) => entries.push(entry),
                Err(err) => debug!(error = %err, "Skipping reading list line"),
            }
        }
        Ok(entries)
    }

    /// Like [`entries`](Self::entries), but an entry with no trailing tag
    /// takes the first ` +stream` tag found inside its title. Titles are
    /// left as written.
    ///
    /// # Errors
    ///
    /// Returns [`ReadingListError::Read`] if the file cannot be read.
    pub fn tagged_entries(&self) -> Result<Vec<ReadingListEntry>> {
        let mut entries = self.entries()?;
        for entry in &mut entries {
            if entry.stream.is_none() {
                entry.stream = EMBEDDED_TAG_PATTERN
                    .captures(&entry.title)
                    .map(|tag| tag[1].to_string());
            }
        }
        Ok(entries)
    }

    /// Returns the first `count` distinct issues of the list.
    ///
    /// A repeated identifier keeps the position of its first occurrence and
    /// takes the title of the latest one.
    ///
    /// # Errors
    ///
    /// Returns [`ReadingListError::Read`] if the file cannot be read.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn prefix(&self, count: usize) -> Result<Vec<ReadingListEntry>> {
        let mut positions: HashMap<IssueId, usize> = HashMap::new();
        let mut prefix: Vec<ReadingListEntry> = Vec::new();
        if count == 0 {
            return Ok(prefix);
        }
        for entry in self.entries()? {
            if let Some(&position) = positions.get(&entry.id) {
                prefix[position] = entry;
                continue;
            }
            debug!(id = entry.id, title = %entry.title, "Found title");
            positions.insert(entry.id, prefix.len());
            prefix.push(entry);
            if prefix.len() >= count {
                break;
            }
        }
        Ok(prefix)
    }

    /// Appends entries to the end of the list, creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ReadingListError::Write`] if the file cannot be opened or written.
    pub fn append(&self, entries: &[ReadingListEntry]) -> Result<()> {
        let write_err = |source| ReadingListError::Write {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;
        for entry in entries {
            writeln!(file, "{entry}").map_err(write_err)?;
        }
        Ok(())
    }

    /// Returns the distinct `(volume, series)` pairs referenced by the list.
    ///
    /// Issues the metadata source does not know, or that carry no volume, are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ReadingListError::Read`] if the file cannot be read.
    pub fn volumes(&self, source: &dyn MetadataSource) -> Result<BTreeSet<(VolumeId, String)>> {
        let mut volumes = BTreeSet::new();
        for entry in self.entries()? {
            let Some(issue) = source.lookup(entry.id) else {
                debug!(id = entry.id, "Issue not in catalog");
                continue;
            };
            if let Some(volume) = issue.volume {
                volumes.insert((volume, issue.series.clone().unwrap_or_default()));
            }
        }
        Ok(volumes)
    }
}
