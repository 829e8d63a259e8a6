use crate::Error;

/// A source of raw monotonic clock readings in nanoseconds.
///
/// All platform-specific clock selection lives behind this trait; callers of
/// the crate never observe which clock backs it. Tests substitute their own
/// implementations to script readings or inject read failures.
pub(crate) trait Source {
    fn read(&self) -> Result<u64, Error>;
}

/// The platform monotonic clock.
#[derive(Copy, Clone, Debug)]
pub(crate) struct OsClock;

impl Source for OsClock {
    fn read(&self) -> Result<u64, Error> {
        read_monotonic()
    }
}

#[cfg(unix)]
fn read_monotonic() -> Result<u64, Error> {
    use std::io;

    // SAFETY: an all-zero timespec is a valid value, and `ts` stays valid for
    // the duration of the call.
    let mut ts: libc::timespec = unsafe { std::mem::zeroed() };

    let ret = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
    if ret != 0 {
        let err = io::Error::last_os_error();
        return Err(match err.raw_os_error() {
            // EINVAL means the running kernel does not support CLOCK_MONOTONIC.
            Some(libc::EINVAL) => Error::ClockUnavailable,
            _ => Error::ClockRead(err),
        });
    }

    Ok(ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64)
}

#[cfg(not(unix))]
fn read_monotonic() -> Result<u64, Error> {
    use std::sync::OnceLock;
    use std::time::Instant;

    // Instant is opaque, so readings are anchored to a process-local start
    // instant and reported as nanoseconds since first use. Readings are only
    // comparable within the same process run, which is all the contract asks.
    static START: OnceLock<Instant> = OnceLock::new();

    let start = *START.get_or_init(Instant::now);
    Ok(start.elapsed().as_nanos() as u64)
}

#[cfg(test)]
mod tests {
    use super::{read_monotonic, OsClock, Source};

    #[test]
    fn test_read_monotonic() {
        let first = read_monotonic().unwrap();
        let second = read_monotonic().unwrap();
        assert!(second >= first);
    }

    #[test]
    fn test_os_clock_reads_through_trait() {
        let clock = OsClock;
        let first = clock.read().unwrap();
        let second = clock.read().unwrap();
        assert!(second >= first);
    }
}
