//! Measures the cache-coherence synchronization latency between two cores.
//!
//! A writer thread and a reader thread, each pinned to its own logical core, play ping-pong on a single
//! shared boolean flag. The reader times batches of handshakes with a monotonic nanosecond clock; the
//! median batch time, normalized per flag transition, approximates how long a store on one core takes to
//! become visible to a spinning load on the other.
//!
//! A calibration pass then runs the same load-check-store loop on the reader's core alone. Its per-operation
//! median is the instrumentation floor reported next to the cross-core figure.
//!
//! ```no_run
//! use cache_sync_latency::{run_benchmark, BenchParams};
//!
//! let report = run_benchmark(&BenchParams::DEFAULT).expect("benchmark failed");
//! println!("{report}");
//! ```
#![deny(clippy::unwrap_used)]

mod affinity;
pub use affinity::*;

mod calibration;
pub use calibration::*;

pub mod clock;

mod driver;
pub use driver::*;

mod error;
pub use error::*;

mod spin_flag;
pub use spin_flag::*;

pub mod stats;
