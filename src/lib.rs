//! A crate for measuring elapsed time on the monotonic clock.
//!
//! Most notably this provides [`init`] for capturing a [`TimeReference`] and
//! [`TimeReference::elapsed`] for querying the nanoseconds elapsed since that
//! reference was captured.
//!
//! The monotonic clock never moves backward and is unaffected by wall-clock
//! adjustments (NTP corrections, manual clock changes), which makes it the
//! right source for measuring durations and intervals. It is useless for
//! telling wall-clock time: a [`TimeReference`] is only meaningful relative
//! to other references captured by the same process.
//!
//! # Example
//! ```
//! use nclock::init;
//!
//! let reference = init().unwrap();
//! // ... do some work ...
//! let nanos = reference.elapsed().unwrap();
//! ```
//!
//! # Shared clock state
//!
//! The default API hands the reference to the caller, so there is no shared
//! state and nothing to synchronize. Programs that want a process-wide
//! "init once, query everywhere" clock can use [`sync::Clock`] instead
//! (requires the `sync` feature).
//!
//! # Feature flags
//! `sync`: Enables the [`sync`] module.

#[cfg(feature = "sync")]
#[cfg_attr(docsrs, doc(cfg(feature = "sync")))]
pub mod sync;

#[cfg(feature = "sync")]
mod loom;
mod time;

use std::io;

use thiserror::Error;

use crate::time::{OsClock, Source};

/// An error returned when reading the monotonic clock.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The platform provides no usable monotonic clock source.
    #[error("no monotonic clock source is available on this platform")]
    ClockUnavailable,
    /// The platform call to read the clock failed. Carries the OS error for
    /// diagnostics.
    #[error("failed to read the monotonic clock: {0}")]
    ClockRead(io::Error),
    /// `elapsed` was called on a [`sync::Clock`] before a successful `init`.
    #[cfg(feature = "sync")]
    #[cfg_attr(docsrs, doc(cfg(feature = "sync")))]
    #[error("the clock has not been initialized")]
    NotInitialized,
}

/// An opaque snapshot of the monotonic clock.
///
/// A `TimeReference` carries no absolute meaning; it only serves as the
/// starting point for [`elapsed`] queries. References are only comparable to
/// other references captured via the same clock within the same process
/// lifetime, never across process restarts or machines.
///
/// [`elapsed`]: Self::elapsed
#[derive(Copy, Clone, Debug)]
pub struct TimeReference(u64);

impl TimeReference {
    /// Returns the number of nanoseconds elapsed since this reference was
    /// captured.
    ///
    /// The returned value is never negative: successive readings of the
    /// monotonic clock are non-decreasing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockUnavailable`] if the platform provides no usable
    /// monotonic clock, or [`Error::ClockRead`] if the platform call to read
    /// the clock fails.
    ///
    /// # Example
    /// ```
    /// use nclock::init;
    ///
    /// let reference = init().unwrap();
    /// let nanos = reference.elapsed().unwrap();
    /// ```
    pub fn elapsed(&self) -> Result<u64, Error> {
        self.elapsed_with(&OsClock)
    }

    fn elapsed_with<S>(&self, source: &S) -> Result<u64, Error>
    where
        S: Source,
    {
        let now = source.read()?;
        Ok(now.saturating_sub(self.0))
    }

    #[cfg(feature = "sync")]
    pub(crate) fn to_bits(self) -> u64 {
        self.0
    }

    #[cfg(feature = "sync")]
    pub(crate) fn from_bits(bits: u64) -> Self {
        Self(bits)
    }
}

/// Captures a new [`TimeReference`] from the monotonic clock.
///
/// Every call produces an independent reference; capturing a new reference
/// never invalidates previously captured ones.
///
/// # Errors
///
/// Returns [`Error::ClockUnavailable`] if the platform provides no usable
/// monotonic clock, or [`Error::ClockRead`] if the platform call to read the
/// clock fails.
///
/// # Example
/// ```
/// use nclock::init;
///
/// let reference = init().unwrap();
/// ```
pub fn init() -> Result<TimeReference, Error> {
    init_with(&OsClock)
}

fn init_with<S>(source: &S) -> Result<TimeReference, Error>
where
    S: Source,
{
    source.read().map(TimeReference)
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::thread;
    use std::time::Duration;

    use crate::time::Source;

    use super::{init, init_with, Error, TimeReference};

    struct FixedSource(u64);

    impl Source for FixedSource {
        fn read(&self) -> Result<u64, Error> {
            Ok(self.0)
        }
    }

    struct FailingSource;

    impl Source for FailingSource {
        fn read(&self) -> Result<u64, Error> {
            Err(Error::ClockRead(io::Error::other("injected clock failure")))
        }
    }

    #[test]
    fn test_init_then_elapsed_is_small() {
        let reference = init().unwrap();
        let nanos = reference.elapsed().unwrap();

        // Immediately after init the elapsed time is tiny; one second absorbs
        // any scheduling jitter.
        assert!(nanos < 1_000_000_000, "elapsed {} ns", nanos);
    }

    #[test]
    fn test_elapsed_is_monotonic() {
        let reference = init().unwrap();

        let mut last = 0;
        for _ in 0..1_000 {
            let nanos = reference.elapsed().unwrap();
            assert!(
                nanos >= last,
                "expected {} ns to be at least {} ns",
                nanos,
                last
            );
            last = nanos;
        }
    }

    #[test]
    fn test_init_is_idempotent() {
        let first = init().unwrap();
        let second = init().unwrap();

        // Both references stay independently usable.
        let from_first = first.elapsed().unwrap();
        let from_second = second.elapsed().unwrap();
        assert!(from_first >= from_second);

        first.elapsed().unwrap();
        second.elapsed().unwrap();
    }

    #[test]
    fn test_elapsed_after_sleep() {
        let reference = init().unwrap();
        let before = reference.elapsed().unwrap();

        thread::sleep(Duration::from_millis(100));

        let after = reference.elapsed().unwrap();
        assert!(after >= before);
        assert!(after >= 100_000_000, "elapsed {} ns", after);
        // Loose upper bound so the test holds on loaded machines.
        assert!(after < 10_000_000_000, "elapsed {} ns", after);
    }

    #[test]
    fn test_elapsed_difference() {
        let reference = init_with(&FixedSource(1_000)).unwrap();
        let nanos = reference.elapsed_with(&FixedSource(1_500)).unwrap();
        assert_eq!(nanos, 500);
    }

    #[test]
    fn test_elapsed_never_negative() {
        // A reading behind the reference clamps to zero instead of wrapping.
        let reference = TimeReference(2_000);
        let nanos = reference.elapsed_with(&FixedSource(1_500)).unwrap();
        assert_eq!(nanos, 0);
    }

    #[test]
    fn test_init_read_failure() {
        let err = init_with(&FailingSource).unwrap_err();
        assert!(matches!(err, Error::ClockRead(_)));
    }

    #[test]
    fn test_elapsed_read_failure() {
        let reference = init_with(&FixedSource(1_000)).unwrap();
        let err = reference.elapsed_with(&FailingSource).unwrap_err();
        assert!(matches!(err, Error::ClockRead(_)));
    }
}
