use crate::{DEFAULT_SENDS_PER_SECOND, ReplicationError, Seconds};

/// How an observer turns an arriving snapshot into a new interpolation target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UpdateType {
    /// Restart the blend from wherever the object is rendered right now.
    ///
    /// Removes any offset between server and client; direction changes can look abrupt.
    #[default]
    Override,
    /// Restart the blend from the previous goal.
    ///
    /// Always blends over the full interval between two authoritative targets; smoother,
    /// but the rendered pose can jump when the previous blend had not finished.
    Addition,
}

/// What an observer does with a snapshot whose sequence is not newer than the last one applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StaleSnapshotPolicy {
    /// Trust the transport's in-order delivery and apply every snapshot.
    #[default]
    Accept,
    /// Ignore duplicates and snapshots older than the current goal.
    Discard,
}

/// Authoring-time configuration of a replicated object.
///
/// Fixed for the object's lifetime, except `sends_per_second` which observers may be told to
/// change (see `ObserverRole::set_sends_per_second`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplicationConfig {
    pub update_type: UpdateType,
    pub sends_per_second: u32,
    pub stale_policy: StaleSnapshotPolicy,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            update_type: UpdateType::default(),
            sends_per_second: DEFAULT_SENDS_PER_SECOND,
            stale_policy: StaleSnapshotPolicy::default(),
        }
    }
}

impl ReplicationConfig {
    pub fn with_update_type(mut self, update_type: UpdateType) -> Self {
        self.update_type = update_type;
        self
    }

    pub fn with_sends_per_second(mut self, sends_per_second: u32) -> Self {
        self.sends_per_second = sends_per_second;
        self
    }

    pub fn with_stale_policy(mut self, stale_policy: StaleSnapshotPolicy) -> Self {
        self.stale_policy = stale_policy;
        self
    }

    pub fn validate(&self) -> Result<(), ReplicationError> {
        validate_send_rate(self.sends_per_second)
    }

    /// Seconds between two snapshots (`1 / sends_per_second`).
    pub fn send_period(&self) -> Seconds {
        send_period(self.sends_per_second)
    }
}

pub(crate) fn validate_send_rate(sends_per_second: u32) -> Result<(), ReplicationError> {
    if sends_per_second == 0 {
        return Err(ReplicationError::InvalidSendRate(sends_per_second));
    }
    Ok(())
}

pub(crate) fn send_period(sends_per_second: u32) -> Seconds {
    1.0 / sends_per_second.max(1) as Seconds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_sends_sixty_times_per_second_with_override() {
        let config = ReplicationConfig::default();

        assert_eq!(config.sends_per_second, 60);
        assert_eq!(config.update_type, UpdateType::Override);
        assert_eq!(config.stale_policy, StaleSnapshotPolicy::Accept);
        assert_eq!(config.validate(), Ok(()));
        assert!((config.send_period() - 1.0 / 60.0).abs() < 1.0e-12);
    }

    #[test]
    fn zero_send_rate_is_rejected() {
        let config = ReplicationConfig::default().with_sends_per_second(0);

        assert_eq!(
            config.validate(),
            Err(ReplicationError::InvalidSendRate(0))
        );
    }
}
