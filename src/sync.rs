//! Process-wide monotonic clock state
//!
//! This module provides [`Clock`] which holds the [`TimeReference`] itself
//! instead of handing it to the caller, matching programs that initialize a
//! clock once and query elapsed time from many places. Its constructor is
//! const allowing to use it in a `static` context.
//!
//! Repeated [`init`] calls overwrite the stored reference. [`elapsed`] fails
//! with [`Error::NotInitialized`] until the first successful [`init`].
//!
//! # Example
//! ```
//! use nclock::sync::Clock;
//!
//! static CLOCK: Clock = Clock::new();
//!
//! fn main() {
//!     CLOCK.init().unwrap();
//!
//!     let nanos = CLOCK.elapsed().unwrap();
//! }
//! ```
//!
//! [`init`]: Clock::init
//! [`elapsed`]: Clock::elapsed

use crate::loom::{AtomicBool, AtomicU64, Ordering};
use crate::time::{OsClock, Source};
use crate::{Error, TimeReference};

/// A monotonic clock holding its own process-wide [`TimeReference`]. Since
/// [`init`] and [`elapsed`] accept a `&self` reference this can be used in a
/// `static` context.
///
/// # Example
/// ```
/// use nclock::sync::Clock;
///
/// static CLOCK: Clock = Clock::new();
///
/// fn main() {
///     CLOCK.init().unwrap();
///
///     let nanos = CLOCK.elapsed().unwrap();
/// }
/// ```
///
/// [`init`]: Self::init
/// [`elapsed`]: Self::elapsed
#[derive(Debug)]
pub struct Clock {
    internal: InternalClock<OsClock>,
}

impl Clock {
    /// Creates a new, uninitialized `Clock`.
    #[cfg(not(loom))]
    #[inline]
    pub const fn new() -> Self {
        Self {
            internal: InternalClock::new(OsClock),
        }
    }

    #[cfg(loom)]
    #[inline]
    pub fn new() -> Self {
        Self {
            internal: InternalClock::new(OsClock),
        }
    }

    /// Captures a new [`TimeReference`] from the monotonic clock and stores
    /// it as the reference for subsequent [`elapsed`] calls.
    ///
    /// The captured reference is also returned. Calling `init` again
    /// overwrites the stored reference.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockUnavailable`] if the platform provides no usable
    /// monotonic clock, or [`Error::ClockRead`] if the platform call to read
    /// the clock fails. On failure the stored reference is left untouched.
    ///
    /// [`elapsed`]: Self::elapsed
    pub fn init(&self) -> Result<TimeReference, Error> {
        self.internal.init()
    }

    /// Returns the number of nanoseconds elapsed since the stored reference
    /// was captured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] if no [`init`] call has succeeded
    /// yet. Returns [`Error::ClockUnavailable`] or [`Error::ClockRead`] under
    /// the same conditions as [`init`].
    ///
    /// [`init`]: Self::init
    pub fn elapsed(&self) -> Result<u64, Error> {
        self.internal.elapsed()
    }
}

#[cfg(not(loom))]
impl Default for Clock {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct InternalClock<T>
where
    T: Source,
{
    reference: AtomicU64,
    initialized: AtomicBool,
    source: T,
}

impl<T> InternalClock<T>
where
    T: Source,
{
    #[cfg(not(loom))]
    #[inline]
    const fn new(source: T) -> Self {
        Self {
            reference: AtomicU64::new(0),
            initialized: AtomicBool::new(false),
            source,
        }
    }

    // AtomicU64 is not const under loom, we have to choose a different code
    // path than the regular `new`.
    #[cfg(loom)]
    #[inline]
    fn new(source: T) -> Self {
        Self {
            reference: AtomicU64::new(0),
            initialized: AtomicBool::new(false),
            source,
        }
    }

    fn init(&self) -> Result<TimeReference, Error> {
        let reference = crate::init_with(&self.source)?;

        // The reference must be visible before the initialized flag: the
        // Release store pairs with the Acquire load in `elapsed`.
        self.reference.store(reference.to_bits(), Ordering::Relaxed);
        self.initialized.store(true, Ordering::Release);

        Ok(reference)
    }

    fn elapsed(&self) -> Result<u64, Error> {
        if !self.initialized.load(Ordering::Acquire) {
            return Err(Error::NotInitialized);
        }

        let reference = TimeReference::from_bits(self.reference.load(Ordering::Relaxed));
        reference.elapsed_with(&self.source)
    }
}
