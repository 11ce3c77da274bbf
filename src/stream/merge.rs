//! Weighted round-robin merge.

use std::collections::VecDeque;
use std::fmt;

use super::weights::compute_weights;
use super::{Entry, ErrorEntry, StreamError, Streams};

/// One line of merged output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergedLine {
    /// A line that failed to classify, emitted unmodified.
    Error(ErrorEntry),
    /// A classified entry.
    Entry(Entry),
}

impl fmt::Display for MergedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(error) => f.write_str(&error.line),
            Self::Entry(entry) => write!(f, "{entry}"),
        }
    }
}

#[derive(Debug)]
struct Lane {
    weight: f64,
    accumulator: f64,
    entries: VecDeque<Entry>,
}

/// Lazy merged sequence. Error lines come first, then entries interleaved by
/// weight. Consumes the streams; not restartable.
#[derive(Debug)]
pub struct MergedStreams {
    errors: std::vec::IntoIter<ErrorEntry>,
    lanes: Vec<Lane>,
    cursor: usize,
    remaining: usize,
}

/// Merges classified streams.
///
/// Each pass visits the non-empty streams in descending weight order, adds
/// each stream's weight to its accumulator, and emits the stream's next entry
/// whenever the accumulator reaches 1.0. The threshold comparison is exact.
///
/// # Errors
///
/// Returns [`StreamError::EmptyStream`] when a registered stream has no entries.
pub fn merge(streams: Streams, sparse_interval: f64) -> Result<MergedStreams, StreamError> {
    let weights = compute_weights(streams.lengths(), sparse_interval)?;
    let (mut entries, errors) = streams.into_parts();

    let mut lanes = Vec::with_capacity(weights.len());
    let mut remaining = 0;
    for weight in weights {
        let queue: VecDeque<Entry> = entries.remove(&weight.name).unwrap_or_default().into();
        remaining += queue.len();
        lanes.push(Lane {
            weight: weight.weight,
            accumulator: 0.0,
            entries: queue,
        });
    }

    Ok(MergedStreams {
        errors: errors.into_iter(),
        lanes,
        cursor: 0,
        remaining,
    })
}

impl Iterator for MergedStreams {
    type Item = MergedLine;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(error) = self.errors.next() {
            return Some(MergedLine::Error(error));
        }
        while self.remaining > 0 {
            if self.cursor >= self.lanes.len() {
                self.cursor = 0;
            }
            let lane = &mut self.lanes[self.cursor];
            self.cursor += 1;
            if lane.entries.is_empty() {
                continue;
            }
            lane.accumulator += lane.weight;
            if lane.accumulator >= 1.0 {
                lane.accumulator -= 1.0;
                self.remaining -= 1;
                return lane.entries.pop_front().map(MergedLine::Entry);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.errors.len() + self.remaining;
        (len, Some(len))
    }
}

impl ExactSizeIterator for MergedStreams {}
