//! The shared flag and the per-round halves of the ping-pong handshake.
//!
//! The writer waits for `false` and stores `true`; the reader waits for `true` and stores `false`. Each
//! role only stores after observing the value the other role left, so at any moment exactly one role owns
//! the flag and no read-modify-write is needed.
//!
//! All accesses use [`Ordering::Relaxed`]. Stronger orderings add fences to every iteration and would
//! change the quantity being measured, so they must not be substituted.

use crate::clock;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Barrier,
};

/// Number of roles meeting at the [`RoundBarrier`] every round.
pub const ROLES: usize = 2;

/// Reusable two-party rendezvous that starts every round.
pub type RoundBarrier = Barrier;

/// Creates the barrier shared by the writer and the reader.
pub fn round_barrier() -> RoundBarrier {
    Barrier::new(ROLES)
}

/// Boolean polled and flipped by both roles without locks.
#[derive(Debug, Default)]
pub struct SpinFlag(AtomicBool);

impl SpinFlag {
    pub const fn new(value: bool) -> Self {
        Self(AtomicBool::new(value))
    }

    #[inline(always)]
    pub fn load(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    #[inline(always)]
    pub fn store(&self, value: bool) {
        self.0.store(value, Ordering::Relaxed)
    }

    /// Busy-waits until the flag reads `expected`. Never yields to the scheduler.
    #[inline(always)]
    pub fn spin_until(&self, expected: bool) {
        while self.load() != expected {}
    }
}

/// Writer half of one round: `ops` times, wait for `false` then store `true`.
#[inline(never)]
pub fn writer_round(flag: &SpinFlag, ops: usize) {
    for _ in 0..ops {
        flag.spin_until(false);
        flag.store(true);
    }
}

/// Reader half of one round: `ops` times, wait for `true` then store `false`.
///
/// Returns the nanoseconds spent in the whole loop.
#[inline(never)]
pub fn reader_round(flag: &SpinFlag, ops: usize) -> u64 {
    let start = clock::now();
    for _ in 0..ops {
        flag.spin_until(true);
        flag.store(false);
    }
    let end = clock::now();
    clock::elapsed(start, end)
}

/// Same-core variant used by calibration: `ops` times, wait for `true` then store `true` again.
///
/// The value never changes, so the cache line never has to migrate and only the load-check-store cost
/// is timed. Returns the nanoseconds spent in the whole loop.
#[inline(never)]
pub fn self_round(flag: &SpinFlag, ops: usize) -> u64 {
    let start = clock::now();
    for _ in 0..ops {
        flag.spin_until(true);
        flag.store(true);
    }
    let end = clock::now();
    clock::elapsed(start, end)
}
