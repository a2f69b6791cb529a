use crate::types::*;
use shared::ReplicationConfig;
use spacetimedb::*;

/// Server-side ground truth of one replicated object, plus its authority scheduling state.
///
/// Private: clients never see the live pose directly, only the snapshots published into
/// [`TransformSnapshot`] at the object's send rate.
#[table(name = replicated_object)]
pub struct ReplicatedObject {
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    /// Identity allowed to write the authoritative pose (the physics collaborator).
    pub owner: Identity,

    pub translation: DbVec3,
    pub rotation: DbQuat,

    /// Whether the body is currently driven by physics. Set by authority setup.
    pub simulated: bool,

    pub update_type: DbUpdateType,
    pub sends_per_second: u32,
    pub stale_policy: DbStalePolicy,

    /// Next send deadline, in seconds since the snapshot timer's epoch.
    /// `None` before the first send.
    pub next_send_secs: Option<f64>,
    /// Sequence number the next snapshot will carry.
    pub next_sequence: u32,
}

impl ReplicatedObject {
    pub fn replication_config(&self) -> ReplicationConfig {
        ReplicationConfig {
            update_type: self.update_type.into(),
            sends_per_second: self.sends_per_second,
            stale_policy: self.stale_policy.into(),
        }
    }
}

/// Authoring data clients need to build an observer for an object.
#[table(name = replication_descriptor, public)]
pub struct ReplicationDescriptor {
    #[primary_key]
    pub object_id: u64,
    pub update_type: DbUpdateType,
    pub sends_per_second: u32,
    pub stale_policy: DbStalePolicy,
}

impl ReplicationDescriptor {
    pub fn of(object: &ReplicatedObject) -> Self {
        Self {
            object_id: object.id,
            update_type: object.update_type,
            sends_per_second: object.sends_per_second,
            stale_policy: object.stale_policy,
        }
    }
}

/// Latest snapshot of each replicated object. This table is the wire: clients subscribe to it
/// and treat every row update as one received snapshot.
#[table(name = transform_snapshot, public)]
pub struct TransformSnapshot {
    #[primary_key]
    pub object_id: u64,
    pub sequence: u32,
    pub translation: DbVec3,
    pub rotation: DbQuat,
}

/// Module-wide replication defaults. Single row with `id = 1`, seeded by `init`.
#[table(name = replication_settings, public)]
pub struct ReplicationSettings {
    #[primary_key]
    pub id: u32,

    /// Send rate given to objects spawned without an explicit one.
    pub default_sends_per_second: u32,

    /// Interval of the scheduled snapshot reducer (microseconds). Must be at most the
    /// shortest send period in use, otherwise objects are sampled less often than configured.
    pub tick_interval_micros: i64,
}

impl ReplicationSettings {
    pub const ID: u32 = 1;
}

impl Default for ReplicationSettings {
    fn default() -> Self {
        Self {
            id: Self::ID,
            default_sends_per_second: shared::DEFAULT_SENDS_PER_SECOND,
            // 120 Hz, twice the default send rate.
            tick_interval_micros: 1_000_000 / 120,
        }
    }
}
