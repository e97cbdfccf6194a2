use std::time::{SystemTime, UNIX_EPOCH};

use crate::TimeSource;

/// The host wall clock.
///
/// Readings follow `SystemTime`, so they jump with NTP corrections or manual
/// adjustments. A backwards jump past the last issued timestamp surfaces as
/// [`Error::ClockRegression`] from the generator.
///
/// A host clock set before 1970 reads as `0`, which generators reject with
/// [`Error::ClockBeforeEpoch`].
///
/// [`Error::ClockRegression`]: crate::Error::ClockRegression
/// [`Error::ClockBeforeEpoch`]: crate::Error::ClockBeforeEpoch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64)
    }
}
