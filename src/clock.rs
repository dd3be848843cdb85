//! Monotonic nanosecond clock shared by all measuring code.

use std::{sync::OnceLock, time::Instant};

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Returns nanoseconds elapsed since the first call in this process.
///
/// Backed by [`Instant`], so readings never go backwards. The first call pins the epoch.
#[inline]
pub fn now() -> u64 {
    let epoch = EPOCH.get_or_init(Instant::now);
    epoch.elapsed().as_nanos() as u64
}

/// Nanoseconds between two readings of [`now`].
#[inline]
pub fn elapsed(start: u64, end: u64) -> u64 {
    end.saturating_sub(start)
}
