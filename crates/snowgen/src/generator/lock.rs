use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    ConfigError, EPOCH_MILLIS, Error, GeneratorState, Identity, Poll, Result, SnowflakeGenerator,
    SnowflakeId, TimeSource,
    generator::{Mutex, MutexGuard, check_sequence},
};

/// A lock-based Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// Each call to [`Self::next_id`] reads the clock, compares it with the last
/// issued timestamp and updates the sequence under one mutex, so concurrent
/// callers can never observe the same `(timestamp, sequence)` pair. When 4096
/// IDs have been issued within one millisecond, the caller spins *while
/// holding the lock* until the clock advances; other callers queue behind it.
///
/// Cloning is cheap and shares the state, so every clone is the same logical
/// generator. Create exactly one per [`Identity`] per process and hand out
/// clones (or an `Arc`) instead of constructing more.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Blocks in place on sequence exhaustion
/// - ✅ Fair access across threads
///
/// ## See Also
/// - [`AtomicSnowflakeGenerator`]
///
/// [`AtomicSnowflakeGenerator`]: crate::AtomicSnowflakeGenerator
#[derive(Debug)]
pub struct LockSnowflakeGenerator<T>
where
    T: TimeSource,
{
    identity: Identity,
    #[cfg(feature = "cache-padded")]
    state: Arc<crossbeam_utils::CachePadded<Mutex<GeneratorState>>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Arc<Mutex<GeneratorState>>,
    time: T,
}

impl<T> Clone for LockSnowflakeGenerator<T>
where
    T: TimeSource + Clone,
{
    fn clone(&self) -> Self {
        Self {
            identity: self.identity,
            state: Arc::clone(&self.state),
            time: self.time.clone(),
        }
    }
}

impl<T> LockSnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a new [`LockSnowflakeGenerator`] for `identity`, reading time
    /// from `time`.
    ///
    /// No ID has been issued yet and the sequence starts at zero.
    ///
    /// # Example
    /// ```
    /// use snowgen::{Identity, LockSnowflakeGenerator, SystemClock};
    ///
    /// let identity = Identity::new(1, 1).unwrap();
    /// let generator = LockSnowflakeGenerator::new(identity, SystemClock);
    ///
    /// let id = generator.next_id().unwrap();
    /// assert_eq!(id.worker_id(), 1);
    /// assert_eq!(id.datacenter_id(), 1);
    /// ```
    pub fn new(identity: Identity, time: T) -> Self {
        Self::from_state(identity, GeneratorState::initial(0), time)
    }

    /// Creates a new generator with an explicit initial sequence.
    ///
    /// The first ID always lands on a new millisecond and resets the sequence
    /// to zero, so this value is only visible through [`Self::state`] until
    /// then.
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
    ///
    /// # Example
    /// ```
    /// use snowgen::{ConfigError, LockSnowflakeGenerator, SystemClock};
    ///
    /// assert!(LockSnowflakeGenerator::from_ids(31, 31, SystemClock).is_ok());
    /// assert!(matches!(
    ///     LockSnowflakeGenerator::from_ids(0, -1, SystemClock),
    ///     Err(ConfigError::DatacenterIdOutOfRange { .. })
    /// ));
    /// ```
    pub fn from_ids(worker_id: i64, datacenter_id: i64, time: T) -> Result<Self, ConfigError> {
        Ok(Self::new(Identity::new(worker_id, datacenter_id)?, time))
    }

    fn from_state(identity: Identity, state: GeneratorState, time: T) -> Self {
        Self {
            identity,
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(state))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(state)),
            time,
        }
    }

    /// Returns the identity embedded in every ID.
    pub const fn identity(&self) -> Identity {
        self.identity
    }

    /// Returns the worker id embedded in every ID.
    pub const fn worker_id(&self) -> u64 {
        self.identity.worker_id()
    }

    /// Returns the datacenter id embedded in every ID.
    pub const fn datacenter_id(&self) -> u64 {
        self.identity.datacenter_id()
    }

    /// Returns a snapshot of the last issued timestamp and sequence.
    ///
    /// # Errors
    /// - Returns an error if the underlying lock has been poisoned.
    pub fn state(&self) -> Result<GeneratorState> {
        Ok(*self.lock()?)
    }

    /// Generates the next ID.
    ///
    /// The whole read-compare-update step runs under the lock:
    ///
    /// 1. Read the clock.
    /// 2. If it is behind the last issued timestamp, fail with
    ///    [`Error::ClockRegression`] and leave the state untouched.
    /// 3. If it equals the last issued timestamp, advance the sequence. When
    ///    the sequence wraps past 4095, spin until the clock moves forward.
    /// 4. Otherwise reset the sequence to zero.
    ///
    /// # Errors
    /// - [`Error::ClockRegression`] if the clock moved backwards
    /// - [`Error::ClockBeforeEpoch`] if the clock reads before
    ///   [`EPOCH_MILLIS`]
    /// - [`Error::LockPoisoned`] if another thread panicked while holding the
    ///   lock
    ///
    /// # Example
    /// ```
    /// use snowgen::{Error, Identity, LockSnowflakeGenerator, SystemClock};
    ///
    /// let generator = LockSnowflakeGenerator::new(Identity::new(0, 0).unwrap(), SystemClock);
    ///
    /// match generator.next_id() {
    ///     Ok(id) => println!("ID: {id}"),
    ///     Err(Error::ClockRegression { last, now }) => {
    ///         eprintln!("clock went back {} ms", last - now);
    ///     }
    ///     Err(e) => panic!("Generator error: {e}"),
    /// }
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<SnowflakeId> {
        let mut state = self.lock()?;
        let mut now = self.time.current_millis();

        let sequence = match state.last_timestamp {
            Some(last) if now < last => return Err(Self::cold_clock_behind(last, now)),
            Some(last) if now == last => {
                let next = (state.sequence + 1) & SnowflakeId::SEQUENCE_MASK;
                if next == 0 {
                    now = self.cold_wait_next_millis(last);
                }
                next
            }
            _ => {
                Self::check_epoch(now)?;
                0
            }
        };

        *state = GeneratorState::at(now, sequence);
        Ok(SnowflakeId::from_identity(
            now - EPOCH_MILLIS,
            &self.identity,
            sequence,
        ))
    }

    /// Attempts to generate the next ID without blocking.
    ///
    /// Returns [`Poll::Pending`] instead of spinning when the current
    /// millisecond's sequence is exhausted; the state is left untouched so the
    /// caller can back off and poll again.
    ///
    /// # Errors
    /// Same as [`Self::next_id`].
    ///
    /// # Example
    /// ```
    /// use snowgen::{Identity, LockSnowflakeGenerator, Poll, SystemClock};
    ///
    /// let generator = LockSnowflakeGenerator::new(Identity::new(0, 0).unwrap(), SystemClock);
    ///
    /// let id = loop {
    ///     match generator.poll_id() {
    ///         Ok(Poll::Ready { id }) => break id,
    ///         Ok(Poll::Pending { yield_for }) => {
    ///             std::thread::sleep(core::time::Duration::from_millis(yield_for));
    ///         }
    ///         Err(e) => panic!("Generator error: {e}"),
    ///     }
    /// };
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn poll_id(&self) -> Result<Poll> {
        let mut state = self.lock()?;
        let now = self.time.current_millis();

        let sequence = match state.last_timestamp {
            Some(last) if now < last => return Err(Self::cold_clock_behind(last, now)),
            Some(last) if now == last => {
                if state.sequence >= SnowflakeId::MAX_SEQUENCE {
                    return Ok(Poll::Pending { yield_for: 1 });
                }
                state.sequence + 1
            }
            _ => {
                Self::check_epoch(now)?;
                0
            }
        };

        *state = GeneratorState::at(now, sequence);
        Ok(Poll::Ready {
            id: SnowflakeId::from_identity(now - EPOCH_MILLIS, &self.identity, sequence),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, GeneratorState>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }

    fn check_epoch(now: u64) -> Result<()> {
        if now < EPOCH_MILLIS {
            return Err(Error::ClockBeforeEpoch { now });
        }
        Ok(())
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(last: u64, now: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(last, now, behind_ms = last - now, "clock moved backwards");
        Error::ClockRegression { last, now }
    }

    #[cold]
    #[inline(never)]
    fn cold_wait_next_millis(&self, last: u64) -> u64 {
        loop {
            let now = self.time.current_millis();
            if now > last {
                break now;
            }
            core::hint::spin_loop();
        }
    }
}

impl<T> SnowflakeGenerator<T> for LockSnowflakeGenerator<T>
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
        self.state()
    }
}
