//! Stream weights and spacing diagnostics.

use tracing::info;

use super::StreamError;

/// Average spacing above which a stream is reported as too sparse to
/// interleave meaningfully.
pub const DEFAULT_SPARSE_INTERVAL: f64 = 20.0;

/// Weight of one stream relative to the largest.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamWeight {
    /// Stream name; `None` is the default stream.
    pub name: Option<String>,
    /// Number of entries.
    pub len: usize,
    /// `len / max_len`, in `(0, 1]`.
    pub weight: f64,
    /// Expected average gap between this stream's entries once merged.
    pub interval: f64,
}

impl StreamWeight {
    /// Stream name for display; the default stream shows as empty.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// Computes weights for `(name, length)` pairs and logs their spacing.
///
/// The result is ordered by descending weight, ties broken by name with the
/// default stream first. This is the order the merge visits streams in.
///
/// # Errors
///
/// Returns [`StreamError::EmptyStream`] when a stream has no entries.
#[allow(clippy::cast_precision_loss)]
pub fn compute_weights<I>(lengths: I, sparse_interval: f64) -> Result<Vec<StreamWeight>, StreamError>
where
    I: IntoIterator<Item = (Option<String>, usize)>,
{
    let lengths: Vec<(Option<String>, usize)> = lengths.into_iter().collect();
    let max_len = lengths.iter().map(|(_, len)| *len).max().unwrap_or(0);

    let mut weights = Vec::with_capacity(lengths.len());
    for (name, len) in lengths {
        if len == 0 {
            return Err(StreamError::EmptyStream {
                name: name.unwrap_or_default(),
            });
        }
        let weight = len as f64 / max_len as f64;
        weights.push(StreamWeight {
            name,
            len,
            weight,
            interval: 0.0,
        });
    }

    let total: f64 = weights.iter().map(|w| w.weight).sum();
    for stream in &mut weights {
        stream.interval = total / stream.weight;
        info!(
            stream = stream.display_name(),
            len = stream.len,
            weight = stream.weight,
            interval = stream.interval,
            "Stream weight"
        );
        if stream.interval > sparse_interval {
            info!(
                stream = stream.display_name(),
                interval = stream.interval,
                "Stream is too sparse to interleave evenly"
            );
        }
    }

    weights.sort_by(|a, b| {
        b.weight
            .total_cmp(&a.weight)
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(weights)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn named(name: &str, len: usize) -> (Option<String>, usize) {
        (Some(name.to_string()), len)
    }

    #[test]
    fn test_weights_relative_to_largest_stream() {
        let weights =
            compute_weights(vec![named("a", 10), named("b", 5), named("c", 2)], 20.0).unwrap();
        let values: Vec<f64> = weights.iter().map(|w| w.weight).collect();
        assert_eq!(values, vec![1.0, 0.5, 0.2]);
    }

    #[test]
    fn test_interval_is_total_weight_over_weight() {
        let weights = compute_weights(vec![named("a", 4), named("b", 2)], 20.0).unwrap();
        assert!((weights[0].interval - 1.5).abs() < 1e-12);
        assert!((weights[1].interval - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_ties_ordered_by_name_default_first() {
        let weights = compute_weights(
            vec![named("zeta", 3), named("alpha", 3), (None, 3)],
            20.0,
        )
        .unwrap();
        let names: Vec<&str> = weights.iter().map(StreamWeight::display_name).collect();
        assert_eq!(names, vec!["", "alpha", "zeta"]);
        assert!(weights[0].name.is_none());
    }

    #[test]
    fn test_empty_stream_is_an_error() {
        let err = compute_weights(vec![named("a", 3), named("b", 0)], 20.0).unwrap_err();
        assert_eq!(
            err,
            StreamError::EmptyStream {
                name: "b".to_string()
            }
        );
    }

    #[test]
    fn test_no_streams_is_empty() {
        assert!(compute_weights(Vec::new(), 20.0).unwrap().is_empty());
    }
}
