use std::sync::Arc;

/// Snowflake epoch: Thursday, November 4, 2010 01:42:54 UTC, in milliseconds
/// since the Unix epoch.
///
/// The timestamp field of every [`SnowflakeId`] counts milliseconds from this
/// instant.
///
/// [`SnowflakeId`]: crate::SnowflakeId
pub const EPOCH_MILLIS: u64 = 1_288_834_974_000;

/// A trait for time sources that return a wall-clock or monotonic timestamp.
///
/// This abstraction allows you to plug in the system clock, a monotonic timer,
/// or a mocked time source in tests.
///
/// The unit is **milliseconds since the Unix epoch**. Generators subtract
/// [`EPOCH_MILLIS`] themselves.
///
/// # Example
///
/// ```
/// use snowgen::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1_288_834_975_000
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1_288_834_975_000);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Box<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}
