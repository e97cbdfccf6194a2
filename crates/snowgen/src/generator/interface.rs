use crate::{ConfigError, GeneratorState, Identity, Poll, Result, SnowflakeId, TimeSource};

/// A minimal interface for generating Snowflake IDs.
///
/// Both [`LockSnowflakeGenerator`] and [`AtomicSnowflakeGenerator`] implement
/// this with identical observable behavior, so callers can stay generic over
/// the concurrency strategy.
///
/// [`LockSnowflakeGenerator`]: crate::LockSnowflakeGenerator
/// [`AtomicSnowflakeGenerator`]: crate::AtomicSnowflakeGenerator
pub trait SnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a new generator with the sequence starting at zero.
    fn new(identity: Identity, time: T) -> Self
    where
        Self: Sized;

    /// Creates a new generator with an explicit initial sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SequenceOutOfRange`] if `sequence` is above
    /// 4095.
    fn with_sequence(identity: Identity, sequence: u64, time: T) -> Result<Self, ConfigError>
    where
        Self: Sized;

    /// Returns the identity embedded in every ID.
    fn identity(&self) -> Identity;

    /// Generates the next ID, blocking while the current millisecond's
    /// sequence is exhausted.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the clock reads earlier than the last
    ///   issued timestamp
    /// - [`Error::ClockBeforeEpoch`] if the clock reads earlier than the
    ///   snowflake epoch
    /// - [`Error::LockPoisoned`] if a lock-based implementation's mutex is
    ///   poisoned
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    /// [`Error::ClockBeforeEpoch`]: crate::Error::ClockBeforeEpoch
    /// [`Error::LockPoisoned`]: crate::Error::LockPoisoned
    fn next_id(&self) -> Result<SnowflakeId>;

    /// Attempts to generate the next ID without blocking.
    ///
    /// # Errors
    ///
    /// Same as [`SnowflakeGenerator::next_id`].
    fn poll_id(&self) -> Result<Poll>;

    /// Returns a snapshot of the generator's mutable state.
    ///
    /// # Errors
    ///
    /// May return [`Error::LockPoisoned`] for lock-based implementations.
    ///
    /// [`Error::LockPoisoned`]: crate::Error::LockPoisoned
    fn state(&self) -> Result<GeneratorState>;
}
