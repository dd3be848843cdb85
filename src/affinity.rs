//! Pins the calling thread to a single logical core.
//!
//! Linux uses `pthread_setaffinity_np`. Other platforms have no backend and [`bind_current_thread`] is a
//! no-op there: the benchmark still runs, but core placement is left to the scheduler.

use std::{fmt, io};
use thiserror::Error;

/// Identifier of a logical processor as numbered by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoreId(pub usize);

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The OS refused to restrict the calling thread to `core`.
#[derive(Debug, Error)]
#[error("failed to pin thread to core {core}: {source}")]
pub struct AffinityError {
    pub core: CoreId,
    #[source]
    pub source: io::Error,
}

/// Whether this build has a real pinning backend.
pub const fn affinity_supported() -> bool {
    cfg!(target_os = "linux")
}

/// Restricts the calling thread to `core`, then yields once so the scheduler can migrate it there before
/// any timed work starts.
pub fn bind_current_thread(core: CoreId) -> Result<(), AffinityError> {
    backend::bind(core).map_err(|source| AffinityError { core, source })?;
    log::debug!(
        "thread {:?} pinned to core {core}",
        std::thread::current().name().unwrap_or("<unnamed>")
    );
    std::thread::yield_now();
    Ok(())
}

/// Binds to `core` when one is given; `None` leaves the thread where the scheduler put it.
pub fn bind_if_requested(core: Option<CoreId>) -> Result<(), AffinityError> {
    match core {
        Some(core) => bind_current_thread(core),
        None => Ok(()),
    }
}

#[cfg(target_os = "linux")]
mod backend {
    use super::CoreId;
    use std::{io, mem};

    pub(super) fn bind(core: CoreId) -> io::Result<()> {
        // `CPU_SET` indexes a fixed-size mask.
        if core.0 >= libc::CPU_SETSIZE as usize {
            return Err(io::Error::from_raw_os_error(libc::EINVAL));
        }

        // SAFETY: `cpu_set_t` is plain data, the index was bounds-checked above, and
        // `pthread_self` always names the calling thread.
        let rc = unsafe {
            let mut set: libc::cpu_set_t = mem::zeroed();
            libc::CPU_ZERO(&mut set);
            libc::CPU_SET(core.0, &mut set);
            libc::pthread_setaffinity_np(
                libc::pthread_self(),
                mem::size_of::<libc::cpu_set_t>(),
                &set,
            )
        };

        match rc {
            0 => Ok(()),
            errno => Err(io::Error::from_raw_os_error(errno)),
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod backend {
    use super::CoreId;
    use std::io;

    pub(super) fn bind(core: CoreId) -> io::Result<()> {
        log::trace!("no affinity backend on this platform; core {core} not enforced");
        Ok(())
    }
}
