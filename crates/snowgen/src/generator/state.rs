use crate::{ConfigError, SnowflakeId};

/// A snapshot of a generator's mutable state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeneratorState {
    /// Unix timestamp (ms) of the last issued ID, or `None` if the generator
    /// has not issued one yet.
    pub last_timestamp: Option<u64>,
    /// Sequence of the last issued ID, or the initial sequence before the
    /// first ID.
    pub sequence: u64,
}

/// Timestamp field value reserved for "never generated" in the packed form.
const NEVER_MILLIS: u64 = u64::MAX >> SnowflakeId::SEQUENCE_BITS;

impl GeneratorState {
    pub(crate) const fn initial(sequence: u64) -> Self {
        Self {
            last_timestamp: None,
            sequence,
        }
    }

    pub(crate) const fn at(last_timestamp: u64, sequence: u64) -> Self {
        Self {
            last_timestamp: Some(last_timestamp),
            sequence,
        }
    }

    /// Packs into one word as `(last_timestamp << 12) | sequence`.
    pub(crate) const fn pack(self) -> u64 {
        let millis = match self.last_timestamp {
            Some(ms) => ms,
            None => NEVER_MILLIS,
        };
        (millis << SnowflakeId::SEQUENCE_BITS) | (self.sequence & SnowflakeId::SEQUENCE_MASK)
    }

    pub(crate) const fn unpack(raw: u64) -> Self {
        let millis = raw >> SnowflakeId::SEQUENCE_BITS;
        Self {
            last_timestamp: if millis == NEVER_MILLIS {
                None
            } else {
                Some(millis)
            },
            sequence: raw & SnowflakeId::SEQUENCE_MASK,
        }
    }
}

pub(crate) fn check_sequence(sequence: u64) -> Result<u64, ConfigError> {
    if sequence > SnowflakeId::MAX_SEQUENCE {
        return Err(ConfigError::SequenceOutOfRange {
            sequence,
            max: SnowflakeId::MAX_SEQUENCE,
        });
    }
    Ok(sequence)
}
