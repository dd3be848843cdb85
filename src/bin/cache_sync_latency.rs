//! Runs one fixed-parameter benchmark and prints the median cache synchronization latency.
//!
//! Diagnostics go to stderr through `env_logger` (`RUST_LOG=cache_sync_latency=debug` for phase logs).
//! A pinning failure exits with status 1.

use cache_sync_latency::{affinity_supported, run_benchmark, BenchParams};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if !affinity_supported() {
        log::warn!("thread pinning is not available on this platform; cores are not enforced");
    }

    match run_benchmark(&BenchParams::DEFAULT) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
