use crate::SnowflakeId;

/// Represents the result of a non-blocking attempt to generate an ID.
///
/// - [`Poll::Ready`] indicates a new ID was successfully generated.
/// - [`Poll::Pending`] means the sequence for the current millisecond is
///   exhausted (or, for the atomic generator, another thread won the race) and
///   the caller should back off for `yield_for` milliseconds before polling
///   again.
///
/// # Example
///
/// ```
/// use snowgen::{Identity, LockSnowflakeGenerator, Poll, SystemClock};
///
/// let generator = LockSnowflakeGenerator::new(Identity::new(0, 0).unwrap(), SystemClock);
///
/// let id = loop {
///     match generator.poll_id().unwrap() {
///         Poll::Ready { id } => break id,
///         Poll::Pending { .. } => std::thread::yield_now(),
///     }
/// };
/// assert_eq!(id.sequence(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: SnowflakeId,
    },
    /// No ID could be generated yet.
    Pending {
        /// Milliseconds to wait before trying again. Zero means retry
        /// immediately.
        yield_for: u64,
    },
}
