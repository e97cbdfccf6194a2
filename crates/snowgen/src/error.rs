/// A result type defaulting to this crate's per-call [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors raised while building a generator or its [`Identity`].
///
/// These are fatal for the configuration that produced them: no generator
/// exists to retry against, so the caller has to supply different values.
///
/// [`Identity`]: crate::Identity
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The worker id does not fit in its 5-bit field.
    #[error("worker id must be between 0 and {max}, got {worker_id}")]
    WorkerIdOutOfRange { worker_id: i64, max: u64 },

    /// The datacenter id does not fit in its 5-bit field.
    #[error("datacenter id must be between 0 and {max}, got {datacenter_id}")]
    DatacenterIdOutOfRange { datacenter_id: i64, max: u64 },

    /// The initial sequence does not fit in its 12-bit field.
    #[error("initial sequence must be between 0 and {max}, got {sequence}")]
    SequenceOutOfRange { sequence: u64, max: u64 },
}

/// Errors returned from a single ID generation call.
///
/// The generator's state is left untouched whenever one of these is returned,
/// so a later call re-reads the clock from scratch.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The time source reported a timestamp earlier than the last one this
    /// generator committed to an ID.
    #[error("clock moved backwards: last issued at {last} ms, now reads {now} ms")]
    ClockRegression {
        /// Last Unix timestamp (ms) used for an ID.
        last: u64,
        /// Unix timestamp (ms) the time source returned.
        now: u64,
    },

    /// The time source reported a timestamp earlier than [`EPOCH_MILLIS`], which
    /// cannot be encoded.
    ///
    /// [`EPOCH_MILLIS`]: crate::EPOCH_MILLIS
    #[error("clock reads {now} ms, which is before the snowflake epoch")]
    ClockBeforeEpoch {
        /// Unix timestamp (ms) the time source returned.
        now: u64,
    },

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is never produced.
    #[error("generator lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
