//! Reduction of a sample series to the figures that get reported.

/// Sorts `samples` in place and returns the element at index `len / 2`.
///
/// For even lengths this picks the upper of the two middle elements; no averaging is done.
/// Returns `None` for an empty series.
pub fn median(samples: &mut [u64]) -> Option<u64> {
    if samples.is_empty() {
        return None;
    }
    samples.sort_unstable();
    Some(samples[samples.len() / 2])
}

/// Integer per-operation share of `total`. `ops` must be non-zero.
#[inline]
pub fn per_op(total: u64, ops: u64) -> u64 {
    total / ops
}
