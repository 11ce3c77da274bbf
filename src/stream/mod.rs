//! Stream classification and weighted merging.
//!
//! Sorting a reading list buckets every issue into a named stream (a catchup
//! backlog, a publisher, or the default stream), orders each stream by
//! publication date, then interleaves the streams so each one is spread
//! through the output in proportion to its size.
//!
//! - [`StreamClassifier`] - routes issues to streams
//! - [`Streams`] - the classified entries plus lines that failed to classify
//! - [`merge`] - the weighted round-robin interleave

mod classifier;
mod error;
mod merge;
mod weights;

pub use classifier::StreamClassifier;
pub use error::StreamError;
pub use merge::{MergedLine, MergedStreams, merge};
pub use weights::{DEFAULT_SPARSE_INTERVAL, StreamWeight, compute_weights};

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use tracing::debug;

use crate::catalog::{IssueId, MetadataSource};

/// Result type for stream operations.
pub type Result<T> = std::result::Result<T, StreamError>;

/// A classified reading list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Catalog identifier.
    pub id: IssueId,
    /// Title as written in the reading list.
    pub title: String,
    /// Stream the entry belongs to; `None` is the default stream.
    pub stream: Option<String>,
    /// Publication date, primary sort key within a stream.
    pub pubdate: Option<NaiveDate>,
    /// Secondary sort key within a stream.
    pub sort_title: String,
}

impl Entry {
    /// Sort key within a stream.
    #[must_use]
    pub fn sort_key(&self) -> (Option<NaiveDate>, &str) {
        (self.pubdate, &self.sort_title)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.title)?;
        if let Some(stream) = &self.stream {
            write!(f, " +{stream}")?;
        }
        Ok(())
    }
}

/// Why a line could not be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorReason {
    /// The line is not `<id> <title>`.
    Parse,
    /// The metadata source does not know the identifier.
    Lookup,
}

/// A line that could not be classified, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    /// Original line.
    pub line: String,
    /// Failure kind.
    pub reason: ErrorReason,
}

/// Entries grouped by stream, plus the error bucket.
#[derive(Debug, Clone, Default)]
pub struct Streams {
    streams: BTreeMap<Option<String>, Vec<Entry>>,
    errors: Vec<ErrorEntry>,
}

impl Streams {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies every line, then orders each stream by publication date
    /// and sort title. Blank lines are dropped.
    pub fn classify_lines<'a, I>(
        lines: I,
        classifier: &mut StreamClassifier,
        source: &dyn MetadataSource,
    ) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut streams = Self::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            match classifier.identify(line, source) {
                Ok(entry) => streams.push(entry),
                Err(error) => streams.push_error(error),
            }
        }
        streams.sort_entries();
        debug!(
            streams = streams.streams.len(),
            errors = streams.errors.len(),
            "Classified reading list"
        );
        streams
    }

    /// Adds an entry to the stream it names.
    pub fn push(&mut self, entry: Entry) {
        self.streams
            .entry(entry.stream.clone())
            .or_default()
            .push(entry);
    }

    /// Adds a line to the error bucket.
    pub fn push_error(&mut self, error: ErrorEntry) {
        self.errors.push(error);
    }

    /// Registers a stream without entries.
    pub fn register(&mut self, name: Option<String>) {
        self.streams.entry(name).or_default();
    }

    /// Orders every stream by its entries' sort keys. Equal keys keep their
    /// insertion order.
    pub fn sort_entries(&mut self) {
        for entries in self.streams.values_mut() {
            entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        }
    }

    /// Lines that failed to classify, in input order.
    #[must_use]
    pub fn errors(&self) -> &[ErrorEntry] {
        &self.errors
    }

    /// Entries of one stream.
    #[must_use]
    pub fn stream(&self, name: Option<&str>) -> Option<&[Entry]> {
        self.streams
            .get(&name.map(str::to_string))
            .map(Vec::as_slice)
    }

    /// `(name, length)` of every registered stream.
    #[must_use]
    pub fn lengths(&self) -> Vec<(Option<String>, usize)> {
        self.streams
            .iter()
            .map(|(name, entries)| (name.clone(), entries.len()))
            .collect()
    }

    /// Total number of classified entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.streams.values().map(Vec::len).sum()
    }

    pub(crate) fn into_parts(self) -> (BTreeMap<Option<String>, Vec<Entry>>, Vec<ErrorEntry>) {
        (self.streams, self.errors)
    }
}
