#[cfg(feature = "tracing")]
use tracing::instrument;

use portable_atomic::{AtomicU64, Ordering};

use crate::{
    ConfigError, EPOCH_MILLIS, Error, GeneratorState, Identity, Poll, Result, SnowflakeGenerator,
    SnowflakeId, TimeSource, generator::check_sequence,
};

/// A lock-free Snowflake ID generator suitable for multi-threaded environments.
///
/// The last issued timestamp and sequence are packed into a single
/// [`AtomicU64`] as `(timestamp << 12) | sequence` and advanced with a
/// compare-and-swap loop, so callers never block on a lock. The generated IDs
/// follow exactly the same rules as [`LockSnowflakeGenerator`]; on sequence
/// exhaustion the caller spins until the clock advances.
///
/// The state word is loaded *before* the clock is read. A competing thread can
/// only commit a timestamp it read earlier, so a non-decreasing clock never
/// reports a spurious regression here.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Never poisons
/// - ❌ No fairness under heavy contention
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - Fair access is sacrificed for higher throughput
///
/// ## See Also
/// - [`LockSnowflakeGenerator`]
///
/// [`LockSnowflakeGenerator`]: crate::LockSnowflakeGenerator
#[derive(Debug)]
pub struct AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    identity: Identity,
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    time: T,
}

impl<T> AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a new [`AtomicSnowflakeGenerator`] for `identity`, reading time
    /// from `time`.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use snowgen::{AtomicSnowflakeGenerator, Identity, SystemClock};
    ///
    /// let identity = Identity::new(4, 2).unwrap();
    /// let generator = Arc::new(AtomicSnowflakeGenerator::new(identity, SystemClock));
    ///
    /// let handles: Vec<_> = (0..4)
    ///     .map(|_| {
    ///         let generator = Arc::clone(&generator);
    ///         std::thread::spawn(move || generator.next_id().unwrap())
    ///     })
    ///     .collect();
    ///
    /// for handle in handles {
    ///     assert_eq!(handle.join().unwrap().worker_id(), 4);
    /// }
    /// ```
    pub fn new(identity: Identity, time: T) -> Self {
        Self::from_state(identity, GeneratorState::initial(0), time)
    }

    /// Creates a new generator with an explicit initial sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SequenceOutOfRange`] if `sequence` is above
    /// 4095.
    pub fn with_sequence(identity: Identity, sequence: u64, time: T) -> Result<Self, ConfigError> {
        let sequence = check_sequence(sequence)?;
        Ok(Self::from_state(
            identity,
            GeneratorState::initial(sequence),
            time,
        ))
    }

    /// Validates the raw ids and creates a new generator.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if either id is outside `0..=31`.
    pub fn from_ids(worker_id: i64, datacenter_id: i64, time: T) -> Result<Self, ConfigError> {
        Ok(Self::new(Identity::new(worker_id, datacenter_id)?, time))
    }

    fn from_state(identity: Identity, state: GeneratorState, time: T) -> Self {
        Self {
            identity,
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(state.pack())),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(state.pack()),
            time,
        }
    }

    /// Returns the identity embedded in every ID.
    pub const fn identity(&self) -> Identity {
        self.identity
    }

    /// Returns a snapshot of the last issued timestamp and sequence.
    pub fn state(&self) -> GeneratorState {
        GeneratorState::unpack(self.state.load(Ordering::Acquire))
    }

    /// Generates the next ID, spinning while the current millisecond's
    /// sequence is exhausted or another thread wins the CAS race.
    ///
    /// # Errors
    /// - [`Error::ClockRegression`] if the clock moved backwards
    /// - [`Error::ClockBeforeEpoch`] if the clock reads before
    ///   [`EPOCH_MILLIS`]
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<SnowflakeId> {
        loop {
            match self.try_advance()? {
                Poll::Ready { id } => break Ok(id),
                Poll::Pending { yield_for } => {
                    if yield_for > 0 {
                        core::hint::spin_loop();
                    }
                }
            }
        }
    }

    /// Attempts to generate the next ID without blocking.
    ///
    /// Returns [`Poll::Pending`] with `yield_for: 1` when the sequence is
    /// exhausted, or `yield_for: 0` when another thread won the CAS race and
    /// an immediate retry is appropriate.
    ///
    /// # Errors
    /// Same as [`Self::next_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn poll_id(&self) -> Result<Poll> {
        self.try_advance()
    }

    fn try_advance(&self) -> Result<Poll> {
        let current_raw = self.state.load(Ordering::Acquire);
        let current = GeneratorState::unpack(current_raw);
        let now = self.time.current_millis();

        let sequence = match current.last_timestamp {
            Some(last) if now < last => return Err(Self::cold_clock_behind(last, now)),
            Some(last) if now == last => {
                if current.sequence >= SnowflakeId::MAX_SEQUENCE {
                    return Ok(Poll::Pending { yield_for: 1 });
                }
                current.sequence + 1
            }
            _ => {
                if now < EPOCH_MILLIS {
                    return Err(Error::ClockBeforeEpoch { now });
                }
                0
            }
        };

        let next_raw = GeneratorState::at(now, sequence).pack();
        if self
            .state
            .compare_exchange(current_raw, next_raw, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Ok(Poll::Ready {
                id: SnowflakeId::from_identity(now - EPOCH_MILLIS, &self.identity, sequence),
            })
        } else {
            // CAS failed - another thread won the race. Yield 0 to retry
            // immediately.
            Ok(Poll::Pending { yield_for: 0 })
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(last: u64, now: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(last, now, behind_ms = last - now, "clock moved backwards");
        Error::ClockRegression { last, now }
    }
}

impl<T> SnowflakeGenerator<T> for AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    fn new(identity: Identity, time: T) -> Self {
        Self::new(identity, time)
    }

    fn with_sequence(identity: Identity, sequence: u64, time: T) -> Result<Self, ConfigError> {
        Self::with_sequence(identity, sequence, time)
    }

    fn identity(&self) -> Identity {
        self.identity()
    }

    fn next_id(&self) -> Result<SnowflakeId> {
        self.next_id()
    }

    fn poll_id(&self) -> Result<Poll> {
        self.poll_id()
    }

    fn state(&self) -> Result<GeneratorState> {
        Ok(self.state())
    }
}
