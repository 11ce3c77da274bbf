//! Per-stream spacing statistics and drift detection between two sorted
//! reading lists.
//!
//! Used to decide whether a freshly sorted candidate list differs enough from
//! the list in use to be worth installing.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::{debug, info};

use crate::readlist::ReadingListEntry;

/// Candidate median may drift from the reference mean by this many
/// reference standard deviations. Half of a normal distribution lies
/// within 0.675 sigma of its mean.
pub const MEDIAN_DRIFT_SIGMAS: f64 = 0.675;

/// Candidate gaps may reach this multiple of the reference median gap.
pub const MAX_GAP_FACTOR: f64 = 2.0;

/// Summary of the gaps between consecutive entries of one stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamStats {
    /// Gap between each entry and the previous entry of the same stream.
    /// The first gap is measured from position 0.
    pub intervals: Vec<usize>,
    /// Arithmetic mean of the gaps.
    pub mean: f64,
    /// Median of the gaps; the mean of the middle two for even counts.
    pub median: f64,
    /// Largest gap.
    pub max: usize,
    /// Population standard deviation of the gaps.
    pub std: f64,
}

#[allow(clippy::cast_precision_loss)]
impl StreamStats {
    /// Computes statistics for a non-empty set of gaps.
    #[must_use]
    pub fn from_intervals(intervals: Vec<usize>) -> Option<Self> {
        let max = *intervals.iter().max()?;
        let count = intervals.len() as f64;
        let mean = intervals.iter().map(|&v| v as f64).sum::<f64>() / count;
        let variance = intervals
            .iter()
            .map(|&v| (v as f64 - mean).powi(2))
            .sum::<f64>()
            / count;

        let mut sorted = intervals.clone();
        sorted.sort_unstable();
        let middle = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[middle - 1] as f64 + sorted[middle] as f64) / 2.0
        } else {
            sorted[middle] as f64
        };

        Some(Self {
            intervals,
            mean,
            median,
            max,
            std: variance.sqrt(),
        })
    }

    /// Number of entries in the stream.
    #[must_use]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Returns true when the stream has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

/// Statistics for every stream of a list, keyed by tag. Untagged entries
/// form the stream named `""`.
pub type ListStats = BTreeMap<String, StreamStats>;

/// Computes per-stream gap statistics for a sorted reading list.
#[must_use]
pub fn stream_stats(entries: &[ReadingListEntry]) -> ListStats {
    let mut last_index: BTreeMap<String, usize> = BTreeMap::new();
    let mut intervals: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, entry) in entries.iter().enumerate() {
        let stream = entry.stream.clone().unwrap_or_default();
        let last = last_index.insert(stream.clone(), index).unwrap_or(0);
        debug!(index, stream = %stream, title = %entry.title, "Interval");
        intervals.entry(stream).or_default().push(index - last);
    }

    let stats: ListStats = intervals
        .into_iter()
        .filter_map(|(stream, gaps)| StreamStats::from_intervals(gaps).map(|s| (stream, s)))
        .collect();
    for (stream, data) in &stats {
        info!(
            stream = %stream,
            len = data.len(),
            mean = data.mean,
            median = data.median,
            max = data.max,
            std = data.std,
            "Stream statistics"
        );
    }
    stats
}

/// Why a candidate list is considered to have drifted from the reference.
#[derive(Debug, Clone, PartialEq)]
pub enum DriftReason {
    /// The two lists do not have the same set of streams.
    StreamsChanged {
        /// Streams present in exactly one of the lists.
        streams: BTreeSet<String>,
    },
    /// A stream's median gap moved too far from the reference mean.
    MedianDrift {
        /// Stream tag
        stream: String,
        /// `|candidate median - reference mean|`
        variation: f64,
        /// Allowed variation
        threshold: f64,
    },
    /// A stream has a gap far larger than the reference median.
    MaxGap {
        /// Stream tag
        stream: String,
        /// Largest candidate gap
        max: usize,
        /// Allowed maximum
        threshold: f64,
    },
}

impl fmt::Display for DriftReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StreamsChanged { streams } => {
                let names: Vec<&str> = streams.iter().map(String::as_str).collect();
                write!(f, "Stream differences encountered: {}", names.join(", "))
            }
            Self::MedianDrift {
                stream,
                variation,
                threshold,
            } => write!(
                f,
                "Median interval for stream '{stream}' exceeds threshold: ({variation:.3}/{threshold:.3})"
            ),
            Self::MaxGap {
                stream,
                max,
                threshold,
            } => write!(
                f,
                "Maximum interval for stream '{stream}' exceeds twice median reference interval ({max}/{threshold:.3})"
            ),
        }
    }
}

/// Compares a candidate list's statistics against the reference.
///
/// A change in the set of streams is reported on its own. Otherwise each
/// stream is checked for median drift and for oversized gaps. An empty
/// result means the candidate is not worth installing.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compare_stats(reference: &ListStats, candidate: &ListStats) -> Vec<DriftReason> {
    let reference_streams: BTreeSet<&String> = reference.keys().collect();
    let candidate_streams: BTreeSet<&String> = candidate.keys().collect();
    let changed: BTreeSet<String> = reference_streams
        .symmetric_difference(&candidate_streams)
        .map(|stream| (*stream).clone())
        .collect();
    if !changed.is_empty() {
        let reason = DriftReason::StreamsChanged { streams: changed };
        info!("{reason}");
        return vec![reason];
    }

    let mut reasons = Vec::new();
    for (stream, base) in reference {
        let Some(other) = candidate.get(stream) else {
            continue;
        };

        let threshold = MEDIAN_DRIFT_SIGMAS * base.std;
        let variation = (other.median - base.mean).abs();
        if variation > threshold {
            reasons.push(DriftReason::MedianDrift {
                stream: stream.clone(),
                variation,
                threshold,
            });
        }

        let threshold = MAX_GAP_FACTOR * base.median;
        if other.max as f64 > threshold {
            reasons.push(DriftReason::MaxGap {
                stream: stream.clone(),
                max: other.max,
                threshold,
            });
        }
    }
    for reason in &reasons {
        info!("{reason}");
    }
    reasons
}
