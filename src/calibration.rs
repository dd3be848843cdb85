use crate::{bind_if_requested, self_round, stats, AffinityError, CoreId, SpinFlag};

/// Runs `samples` same-core rounds of `ops` load-check-store iterations on `flag`.
///
/// The flag is reset to `true` first, so no round ever waits on another core.
pub fn self_samples(flag: &SpinFlag, samples: usize, ops: usize) -> Vec<u64> {
    flag.store(true);
    let mut series = Vec::with_capacity(samples);
    for _ in 0..samples {
        series.push(self_round(flag, ops));
    }
    series
}

/// Measures the per-operation self-latency on `core` (or wherever the thread is, for `None`).
///
/// Pins the calling thread, collects a calibration series with [`self_samples`] and returns its median
/// divided by `ops`. Returns 0 for an empty series.
pub fn self_latency(
    flag: &SpinFlag,
    core: Option<CoreId>,
    samples: usize,
    ops: usize,
) -> Result<u64, AffinityError> {
    log::trace!("entering `self_latency`");
    bind_if_requested(core)?;
    log::debug!("calibrating: {samples} samples x {ops} ops");

    let mut series = self_samples(flag, samples, ops);
    let correction = stats::median(&mut series)
        .map(|m| stats::per_op(m, ops as u64))
        .unwrap_or(0);

    log::debug!("self-latency {correction} ns/op");
    Ok(correction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_samples_length_and_flag() {
        let flag = SpinFlag::new(false);
        let series = self_samples(&flag, 37, 10);
        assert_eq!(series.len(), 37);
        assert!(flag.load());
    }

    #[test]
    fn test_self_latency_unpinned_is_small() {
        let flag = SpinFlag::new(false);
        let correction = self_latency(&flag, None, 101, 1000).unwrap();
        // A relaxed load plus store costs nanoseconds; anything near a microsecond means
        // the loop is not what we think it is.
        assert!(correction < 1_000, "correction={correction}");
    }
}
