#![allow(dead_code)]

use cache_sync_latency::{BenchParams, CoreId};

pub fn are_close(left: f64, right: f64, pct: f64) -> bool {
    let avg_abs = (left.abs() + right.abs()) / 2.0;
    (left - right).abs() <= avg_abs * pct
}

/// Unpinned parameters small enough to finish quickly even when both roles share one CPU.
pub fn small_params(samples: usize, ops_per_sample: usize) -> BenchParams {
    BenchParams {
        samples,
        ops_per_sample,
        writer_core: None,
        reader_core: None,
    }
}

/// Number of CPUs this process may run on.
pub fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Two distinct cores the process is allowed to use, if there are two.
#[cfg(target_os = "linux")]
pub fn two_allowed_cores() -> Option<(CoreId, CoreId)> {
    let mut set: libc::cpu_set_t = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::sched_getaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &mut set) };
    if rc != 0 {
        return None;
    }
    let mut allowed = (0..libc::CPU_SETSIZE as usize).filter(|&i| unsafe { libc::CPU_ISSET(i, &set) });
    let first = allowed.next()?;
    let second = allowed.next()?;
    Some((CoreId(first), CoreId(second)))
}

#[cfg(not(target_os = "linux"))]
pub fn two_allowed_cores() -> Option<(CoreId, CoreId)> {
    None
}

pub fn init_logging() {
    std::env::set_var("RUST_LOG", "cache_sync_latency=debug");
    _ = env_logger::builder().is_test(true).try_init();
}
