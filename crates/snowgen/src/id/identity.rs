use crate::{ConfigError, SnowflakeId};

/// The externally assigned `(worker, datacenter)` pair embedded in every ID a
/// generator produces.
///
/// Uniqueness across a fleet rests entirely on no two live generators sharing
/// an identity. Assigning identities is the deployment's job; this type only
/// guarantees that both fields fit the bit layout.
///
/// # Example
///
/// ```
/// use snowgen::{ConfigError, Identity};
///
/// let identity = Identity::new(1, 2).unwrap();
/// assert_eq!(identity.worker_id(), 1);
/// assert_eq!(identity.datacenter_id(), 2);
///
/// assert!(matches!(
///     Identity::new(32, 0),
///     Err(ConfigError::WorkerIdOutOfRange { worker_id: 32, .. })
/// ));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity {
    worker_id: u64,
    datacenter_id: u64,
}

impl Identity {
    /// Validates and builds an identity.
    ///
    /// Inputs are signed so that negative values coming from configuration are
    /// rejected here rather than wrapped around.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::WorkerIdOutOfRange`] if `worker_id` is outside
    ///   `0..=31`
    /// - [`ConfigError::DatacenterIdOutOfRange`] if `datacenter_id` is
    ///   outside `0..=31`
    pub fn new(worker_id: i64, datacenter_id: i64) -> Result<Self, ConfigError> {
        let worker = u64::try_from(worker_id)
            .ok()
            .filter(|&w| w <= SnowflakeId::MAX_WORKER_ID)
            .ok_or(ConfigError::WorkerIdOutOfRange {
                worker_id,
                max: SnowflakeId::MAX_WORKER_ID,
            })?;
        let datacenter = u64::try_from(datacenter_id)
            .ok()
            .filter(|&d| d <= SnowflakeId::MAX_DATACENTER_ID)
            .ok_or(ConfigError::DatacenterIdOutOfRange {
                datacenter_id,
                max: SnowflakeId::MAX_DATACENTER_ID,
            })?;

        Ok(Self {
            worker_id: worker,
            datacenter_id: datacenter,
        })
    }

    /// Returns the worker id (`0..=31`).
    pub const fn worker_id(&self) -> u64 {
        self.worker_id
    }

    /// Returns the datacenter id (`0..=31`).
    pub const fn datacenter_id(&self) -> u64 {
        self.datacenter_id
    }
}
