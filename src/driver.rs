//! Orchestration of one benchmark run: the pinned writer/reader pair, calibration and reduction.

use crate::{
    bind_if_requested, reader_round, round_barrier, self_latency, stats, writer_round,
    AffinityError, BenchError, CoreId, RoundBarrier, SpinFlag,
};
use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
    thread,
};

//=================
// BenchParams

/// The four tunables of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchParams {
    /// Number of rounds, i.e. entries in the sample series.
    pub samples: usize,
    /// Handshakes per round.
    pub ops_per_sample: usize,
    /// Core for the writer role; `None` leaves it unpinned.
    pub writer_core: Option<CoreId>,
    /// Core for the reader role and for calibration; `None` leaves it unpinned.
    pub reader_core: Option<CoreId>,
}

impl BenchParams {
    /// Parameters used by the `cache_sync_latency` binary.
    pub const DEFAULT: Self = Self {
        samples: 10_000,
        ops_per_sample: 10_000,
        writer_core: Some(CoreId(1)),
        reader_core: Some(CoreId(2)),
    };

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.samples == 0 {
            return Err(BenchError::InvalidParams("samples must be at least 1"));
        }
        if self.ops_per_sample == 0 {
            return Err(BenchError::InvalidParams("ops_per_sample must be at least 1"));
        }
        if self.writer_core.is_some() && self.writer_core == self.reader_core {
            return Err(BenchError::InvalidParams(
                "writer and reader must be pinned to distinct cores",
            ));
        }
        Ok(())
    }
}

impl Default for BenchParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

//=================
// Report

/// Outcome of [`run_benchmark`]. All figures are integer nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    /// Median round time divided by `2 * ops_per_sample`.
    pub raw_median_ns: u64,
    /// Median calibration round time divided by `ops_per_sample`.
    pub correction_ns: u64,
    /// Length of the cross-core sample series that was reduced.
    pub samples: usize,
}

impl Report {
    /// `raw_median_ns - correction_ns`; negative when calibration exceeded the cross-core figure.
    pub fn corrected_ns(&self) -> i64 {
        self.raw_median_ns as i64 - self.correction_ns as i64
    }

    /// True when the same-core floor is not below the cross-core median, which should not happen on
    /// a quiet machine with real core placement.
    pub fn is_suspicious(&self) -> bool {
        self.correction_ns >= self.raw_median_ns
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "median cache syncronazation latency: ({}-{}) ns",
            self.raw_median_ns, self.correction_ns
        )
    }
}

//=================
// Run

/// Pins the role, then meets the peer once so that a pinning failure on either side stops both before
/// the first measured round. Returns `Ok(false)` when the peer failed.
fn start_role(
    core: Option<CoreId>,
    barrier: &RoundBarrier,
    abort: &AtomicBool,
) -> Result<bool, AffinityError> {
    let bound = bind_if_requested(core);
    if bound.is_err() {
        abort.store(true, Ordering::SeqCst);
    }
    barrier.wait();
    bound?;
    Ok(!abort.load(Ordering::SeqCst))
}

fn join_role<T>(
    role: &'static str,
    handle: thread::ScopedJoinHandle<'_, Result<T, AffinityError>>,
) -> Result<T, BenchError> {
    handle
        .join()
        .map_err(|_| BenchError::RolePanicked(role))?
        .map_err(BenchError::from)
}

/// Runs the writer and reader roles for `params.samples` rounds on `flag` and returns the reader's
/// series of round times, one entry per round, in round order.
///
/// `flag` must be `false` on entry so the writer moves first.
pub fn collect_samples(flag: &SpinFlag, params: &BenchParams) -> Result<Vec<u64>, BenchError> {
    log::trace!("entering `collect_samples`");
    params.validate()?;

    let BenchParams {
        samples,
        ops_per_sample: ops,
        writer_core,
        reader_core,
    } = *params;
    let barrier = round_barrier();
    let abort = AtomicBool::new(false);

    thread::scope(|s| -> Result<Vec<u64>, BenchError> {
        let barrier = &barrier;
        let abort = &abort;

        let writer = thread::Builder::new()
            .name("writer".into())
            .spawn_scoped(s, move || -> Result<(), AffinityError> {
                if !start_role(writer_core, barrier, abort)? {
                    return Ok(());
                }
                for _ in 0..samples {
                    barrier.wait();
                    writer_round(flag, ops);
                }
                Ok(())
            })
            .map_err(|source| BenchError::Spawn {
                role: "writer",
                source,
            })?;

        let reader = thread::Builder::new()
            .name("reader".into())
            .spawn_scoped(s, move || -> Result<Vec<u64>, AffinityError> {
                let mut series = Vec::with_capacity(samples);
                if !start_role(reader_core, barrier, abort)? {
                    return Ok(series);
                }
                for _ in 0..samples {
                    barrier.wait();
                    series.push(reader_round(flag, ops));
                }
                Ok(series)
            });

        let reader = match reader {
            Ok(reader) => reader,
            Err(source) => {
                // Stand in for the reader at the start-up rendezvous so the writer can leave.
                abort.store(true, Ordering::SeqCst);
                barrier.wait();
                let _ = writer.join();
                return Err(BenchError::Spawn {
                    role: "reader",
                    source,
                });
            }
        };

        let writer_res = join_role("writer", writer);
        let reader_res = join_role("reader", reader);
        writer_res?;
        let series = reader_res?;
        log::debug!("collected {} cross-core samples", series.len());
        Ok(series)
    })
}

/// Performs one complete run: cross-core rounds, then calibration on the reader's core from the calling
/// thread, then reduction of both series to a [`Report`].
///
/// The calling thread stays pinned to `params.reader_core` afterwards.
pub fn run_benchmark(params: &BenchParams) -> Result<Report, BenchError> {
    log::trace!("entering `run_benchmark`");
    params.validate()?;
    let ops = params.ops_per_sample;

    let flag = SpinFlag::new(false);
    let mut series = collect_samples(&flag, params)?;

    let correction_ns = self_latency(&flag, params.reader_core, params.samples, ops)?;

    let samples = series.len();
    let raw_median_ns = stats::median(&mut series)
        .map(|m| stats::per_op(m, 2 * ops as u64))
        .ok_or(BenchError::InvalidParams("samples must be at least 1"))?;

    let report = Report {
        raw_median_ns,
        correction_ns,
        samples,
    };
    if report.is_suspicious() {
        log::warn!(
            "calibration floor {correction_ns} ns is not below cross-core median {raw_median_ns} ns; \
             core placement may not be effective"
        );
    }
    log::debug!("{report:?}");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let p = BenchParams::default();
        assert_eq!(p.samples, 10_000);
        assert_eq!(p.ops_per_sample, 10_000);
        assert_eq!(p.writer_core, Some(CoreId(1)));
        assert_eq!(p.reader_core, Some(CoreId(2)));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_params() {
        let zero_samples = BenchParams {
            samples: 0,
            ..BenchParams::DEFAULT
        };
        let zero_ops = BenchParams {
            ops_per_sample: 0,
            ..BenchParams::DEFAULT
        };
        let same_core = BenchParams {
            writer_core: Some(CoreId(3)),
            reader_core: Some(CoreId(3)),
            ..BenchParams::DEFAULT
        };
        for p in [zero_samples, zero_ops, same_core] {
            assert!(matches!(p.validate(), Err(BenchError::InvalidParams(_))), "{p:?}");
        }

        let unpinned = BenchParams {
            writer_core: None,
            reader_core: None,
            ..BenchParams::DEFAULT
        };
        assert!(unpinned.validate().is_ok());
    }

    #[test]
    fn test_report_format() {
        let report = Report {
            raw_median_ns: 42,
            correction_ns: 3,
            samples: 10_000,
        };
        assert_eq!(
            report.to_string(),
            "median cache syncronazation latency: (42-3) ns"
        );
        assert_eq!(report.corrected_ns(), 39);
        assert!(!report.is_suspicious());
    }

    #[test]
    fn test_report_suspicious() {
        let report = Report {
            raw_median_ns: 2,
            correction_ns: 5,
            samples: 1,
        };
        assert_eq!(report.corrected_ns(), -3);
        assert!(report.is_suspicious());
    }
}
