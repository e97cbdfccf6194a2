use core::fmt;

use crate::{EPOCH_MILLIS, Identity, write_bit_layout_debug};

/// A 64-bit Snowflake ID using the Twitter layout with the machine field split
/// into datacenter and worker ids.
///
/// - 1 bit reserved (always zero)
/// - 41 bits timestamp (ms since [`EPOCH_MILLIS`])
/// - 5 bits datacenter ID
/// - 5 bits worker ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63           63 62            22 21            17 16        12 11             0
///              +--------------+----------------+----------------+------------+---------------+
///  Field:      | reserved (1) | timestamp (41) | datacenter (5) | worker (5) | sequence (12) |
///              +--------------+----------------+----------------+------------+---------------+
///              |<------------------- MSB ---------- 64 bits ---------- LSB ------------------>|
/// ```
///
/// Ordering compares the raw value as an unsigned integer, which is the same
/// as ordering by `(timestamp, datacenter, worker, sequence)`.
///
/// # Example
///
/// ```
/// use snowgen::SnowflakeId;
///
/// let id = SnowflakeId::from_components(1000, 1, 1, 0);
/// assert_eq!(id.to_raw(), 4_194_439_168);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.datacenter_id(), 1);
/// assert_eq!(id.worker_id(), 1);
/// assert_eq!(id.sequence(), 0);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    /// Width of the sequence field.
    pub const SEQUENCE_BITS: u32 = 12;

    /// Width of the worker ID field.
    pub const WORKER_ID_BITS: u32 = 5;

    /// Width of the datacenter ID field.
    pub const DATACENTER_ID_BITS: u32 = 5;

    /// Width of the timestamp field.
    pub const TIMESTAMP_BITS: u32 = 41;

    /// Bitmask for extracting the 12-bit sequence field. Occupies bits 0
    /// through 11.
    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

    /// Bitmask for extracting the 5-bit worker ID field. Occupies bits 12
    /// through 16.
    pub const WORKER_ID_MASK: u64 = (1 << Self::WORKER_ID_BITS) - 1;

    /// Bitmask for extracting the 5-bit datacenter ID field. Occupies bits 17
    /// through 21.
    pub const DATACENTER_ID_MASK: u64 = (1 << Self::DATACENTER_ID_BITS) - 1;

    /// Bitmask for extracting the 41-bit timestamp field. Occupies bits 22
    /// through 62.
    pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;

    /// Number of bits to shift the sequence field (bit 0).
    pub const SEQUENCE_SHIFT: u32 = 0;

    /// Number of bits to shift the worker ID to its correct position (bit 12).
    pub const WORKER_ID_SHIFT: u32 = Self::SEQUENCE_BITS;

    /// Number of bits to shift the datacenter ID to its correct position (bit
    /// 17).
    pub const DATACENTER_ID_SHIFT: u32 = Self::WORKER_ID_SHIFT + Self::WORKER_ID_BITS;

    /// Number of bits to shift the timestamp to its correct position (bit 22).
    pub const TIMESTAMP_SHIFT: u32 = Self::DATACENTER_ID_SHIFT + Self::DATACENTER_ID_BITS;

    /// Largest valid worker ID.
    pub const MAX_WORKER_ID: u64 = Self::WORKER_ID_MASK;

    /// Largest valid datacenter ID.
    pub const MAX_DATACENTER_ID: u64 = Self::DATACENTER_ID_MASK;

    /// Largest sequence value within one millisecond.
    pub const MAX_SEQUENCE: u64 = Self::SEQUENCE_MASK;

    /// Largest encodable timestamp delta (ms since [`EPOCH_MILLIS`]).
    pub const MAX_TIMESTAMP: u64 = Self::TIMESTAMP_MASK;

    /// Packs the four fields into an ID.
    ///
    /// `timestamp` is the delta in milliseconds since [`EPOCH_MILLIS`], not a
    /// Unix timestamp. Every field is masked to its width, so a timestamp past
    /// [`Self::MAX_TIMESTAMP`] wraps rather than spilling into the reserved
    /// bit.
    pub const fn from_components(
        timestamp: u64,
        datacenter_id: u64,
        worker_id: u64,
        sequence: u64,
    ) -> Self {
        debug_assert!(datacenter_id <= Self::DATACENTER_ID_MASK, "datacenter_id overflow");
        debug_assert!(worker_id <= Self::WORKER_ID_MASK, "worker_id overflow");
        debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");

        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let datacenter_id = (datacenter_id & Self::DATACENTER_ID_MASK) << Self::DATACENTER_ID_SHIFT;
        let worker_id = (worker_id & Self::WORKER_ID_MASK) << Self::WORKER_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | datacenter_id | worker_id | sequence,
        }
    }

    /// Packs an ID for `identity` at the given timestamp delta and sequence.
    pub const fn from_identity(timestamp: u64, identity: &Identity, sequence: u64) -> Self {
        Self::from_components(
            timestamp,
            identity.datacenter_id(),
            identity.worker_id(),
            sequence,
        )
    }

    /// Wraps a raw value without validation.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns the raw packed value.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Extracts the timestamp delta (ms since [`EPOCH_MILLIS`]).
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the timestamp as milliseconds since the Unix epoch.
    pub const fn unix_millis(&self) -> u64 {
        self.timestamp() + EPOCH_MILLIS
    }

    /// Extracts the datacenter ID.
    pub const fn datacenter_id(&self) -> u64 {
        (self.id >> Self::DATACENTER_ID_SHIFT) & Self::DATACENTER_ID_MASK
    }

    /// Extracts the worker ID.
    pub const fn worker_id(&self) -> u64 {
        (self.id >> Self::WORKER_ID_SHIFT) & Self::WORKER_ID_MASK
    }

    /// Extracts the sequence number.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Returns `true` if the reserved sign bit is clear.
    ///
    /// Every generated ID is valid; this only matters for values decoded from
    /// untrusted input.
    pub const fn is_valid(&self) -> bool {
        self.id >> 63 == 0
    }

    /// Returns the ID as a zero-padded 20-digit string.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl From<SnowflakeId> for i64 {
    /// Reinterprets the raw bits. Generated IDs keep the reserved bit clear and
    /// convert to a non-negative value; an ID built with [`SnowflakeId::from_raw`]
    /// that has the reserved bit set wraps to a negative number. Check
    /// [`SnowflakeId::is_valid`] first when the source is untrusted.
    fn from(id: SnowflakeId) -> Self {
        id.to_raw() as i64
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_bit_layout_debug(f, self, "SnowflakeId")
    }
}
