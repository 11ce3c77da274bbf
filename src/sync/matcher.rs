//! Matching-block sequence alignment.
//!
//! Finds the longest contiguous run common to both sequences, then recurses on
//! the left and right remainders. The blocks returned are non-overlapping and
//! increasing in both sequences, so their elements form a common subsequence
//! that favours long contiguous runs.

use std::collections::HashMap;
use std::hash::Hash;

/// A run of `size` equal elements at `a[a_start..]` and `b[b_start..]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchingBlock {
    /// Start position in the first sequence.
    pub a_start: usize,
    /// Start position in the second sequence.
    pub b_start: usize,
    /// Length of the run.
    pub size: usize,
}

/// Returns the matching blocks of `a` and `b`, ordered and with adjacent
/// blocks merged.
#[must_use]
pub fn matching_blocks<T: Eq + Hash>(a: &[T], b: &[T]) -> Vec<MatchingBlock> {
    let mut positions: HashMap<&T, Vec<usize>> = HashMap::new();
    for (j, item) in b.iter().enumerate() {
        positions.entry(item).or_default().push(j);
    }

    let mut blocks = Vec::new();
    let mut ranges = vec![(0, a.len(), 0, b.len())];
    while let Some((a_lo, a_hi, b_lo, b_hi)) = ranges.pop() {
        let block = longest_match(a, &positions, (a_lo, a_hi), (b_lo, b_hi));
        if block.size == 0 {
            continue;
        }
        if a_lo < block.a_start && b_lo < block.b_start {
            ranges.push((a_lo, block.a_start, b_lo, block.b_start));
        }
        let a_end = block.a_start + block.size;
        let b_end = block.b_start + block.size;
        if a_end < a_hi && b_end < b_hi {
            ranges.push((a_end, a_hi, b_end, b_hi));
        }
        blocks.push(block);
    }
    blocks.sort_unstable();

    let mut merged: Vec<MatchingBlock> = Vec::with_capacity(blocks.len());
    for block in blocks {
        if let Some(last) = merged.last_mut()
            && last.a_start + last.size == block.a_start
            && last.b_start + last.size == block.b_start
        {
            last.size += block.size;
            continue;
        }
        merged.push(block);
    }
    merged
}

/// Longest common run within the given ranges. Ties go to the run starting
/// earliest in `a`, then earliest in `b`.
fn longest_match<T: Eq + Hash>(
    a: &[T],
    positions: &HashMap<&T, Vec<usize>>,
    (a_lo, a_hi): (usize, usize),
    (b_lo, b_hi): (usize, usize),
) -> MatchingBlock {
    let mut best = MatchingBlock {
        a_start: a_lo,
        b_start: b_lo,
        size: 0,
    };
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();
    for (i, item) in a.iter().enumerate().take(a_hi).skip(a_lo) {
        let mut next_lengths = HashMap::new();
        for &j in positions.get(item).map_or(&[][..], Vec::as_slice) {
            if j < b_lo {
                continue;
            }
            if j >= b_hi {
                break;
            }
            let previous = j
                .checked_sub(1)
                .and_then(|k| run_lengths.get(&k))
                .copied()
                .unwrap_or(0);
            let length = previous + 1;
            next_lengths.insert(j, length);
            if length > best.size {
                best = MatchingBlock {
                    a_start: i + 1 - length,
                    b_start: j + 1 - length,
                    size: length,
                };
            }
        }
        run_lengths = next_lengths;
    }
    best
}

/// Returns the elements of `a` that fall inside a matching block.
#[must_use]
pub fn common_elements<T: Eq + Hash + Clone>(a: &[T], b: &[T]) -> Vec<T> {
    matching_blocks(a, b)
        .iter()
        .flat_map(|block| a[block.a_start..block.a_start + block.size].iter().cloned())
        .collect()
}
