//! Fractional index interpolation.

use super::ReindexError;

/// Smallest spacing allowed between interpolated indices.
pub const MIN_INDEX_SPACING: f64 = 0.001;

/// Spacing between indices appended after the last placed item.
pub const APPEND_SPACING: f64 = 10.0;

/// Indices must stay below this so the prefix keeps four integer digits and
/// alphabetical order matches numeric order.
pub const INDEX_LIMIT: f64 = 10_000.0;

/// Indices are rounded to this many decimal places so they survive a
/// round trip through a filename.
const INDEX_SCALE: f64 = 1_000_000.0;

/// Assigns indices to `items` strictly between `start` and `finish`, or
/// after `start` when there is no upper bound.
///
/// Interpolated indices snap to an integer whenever that integer is above the
/// previously assigned index, so most files keep short prefixes.
///
/// # Errors
///
/// Returns [`ReindexError`] when `finish <= start` or when the spacing
/// between items would fall below [`MIN_INDEX_SPACING`].
pub fn new_indexes<T: Copy>(
    start: f64,
    finish: Option<f64>,
    items: &[T],
) -> Result<Vec<(T, f64)>, ReindexError> {
    let Some(finish) = finish else {
        return Ok(append_indexes(start, items));
    };
    if items.is_empty() {
        return Ok(Vec::new());
    }
    if finish <= start {
        return Err(ReindexError::InvertedBounds { start, finish });
    }

    #[allow(clippy::cast_precision_loss)]
    let slots = (items.len() + 1) as f64;
    let interval = (finish - start) / slots;
    if interval < MIN_INDEX_SPACING {
        return Err(ReindexError::IntervalTooSmall {
            start,
            finish,
            count: items.len(),
            interval,
        });
    }

    let mut assigned = Vec::with_capacity(items.len());
    let mut previous = start;
    let mut raw = start;
    for &item in items {
        raw += interval;
        let floor = raw.floor();
        let index = if floor > previous {
            floor
        } else {
            (raw * INDEX_SCALE).round() / INDEX_SCALE
        };
        assigned.push((item, index));
        previous = index;
    }
    Ok(assigned)
}

/// Assigns integer indices after `start`, spaced by [`APPEND_SPACING`].
#[must_use]
pub fn append_indexes<T: Copy>(start: f64, items: &[T]) -> Vec<(T, f64)> {
    let mut next = start.floor();
    items
        .iter()
        .map(|&item| {
            next += APPEND_SPACING;
            (item, next)
        })
        .collect()
}

/// Assigns fresh indices to every item from zero, spreading them below
/// [`INDEX_LIMIT`] when appending would not fit.
#[must_use]
pub fn renumber<T: Copy>(items: &[T]) -> Vec<(T, f64)> {
    let appended = append_indexes(0.0, items);
    if appended.iter().all(|&(_, index)| index < INDEX_LIMIT) {
        return appended;
    }
    new_indexes(0.0, Some(INDEX_LIMIT), items).unwrap_or(appended)
}
