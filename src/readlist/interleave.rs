//! Fixed-rate interleaving of two lists.

/// Interleaves `second` into `first`: `rate` items from `first`, then one
/// from `second`, repeated until both are exhausted.
///
/// A `rate` of zero is treated as one.
#[must_use]
pub fn interleave<T>(first: Vec<T>, second: Vec<T>, rate: usize) -> Vec<T> {
    let rate = rate.max(1);
    let mut merged = Vec::with_capacity(first.len() + second.len());
    let mut first = first.into_iter();
    let mut second = second.into_iter();

    loop {
        let before = merged.len();
        merged.extend(first.by_ref().take(rate));
        merged.extend(second.next());
        if merged.len() == before {
            break;
        }
    }
    merged
}
