//! Generated row types into the `shared` replication types.

use crate::module_bindings::{
    DbQuat, DbStalePolicy, DbUpdateType, DbVec3, ReplicationDescriptor, TransformSnapshot,
};
use nalgebra as na;
use shared::{ReplicationConfig, Snapshot, StaleSnapshotPolicy, Transform, UpdateType};

impl From<&DbVec3> for na::Vector3<f32> {
    fn from(v: &DbVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// The module rejects zero-norm rotations, so normalizing here never divides by zero.
impl From<&DbQuat> for na::UnitQuaternion<f32> {
    fn from(q: &DbQuat) -> Self {
        na::UnitQuaternion::from_quaternion(na::Quaternion::new(q.w, q.x, q.y, q.z))
    }
}

impl From<&DbUpdateType> for UpdateType {
    fn from(value: &DbUpdateType) -> Self {
        match value {
            DbUpdateType::Override => UpdateType::Override,
            DbUpdateType::Addition => UpdateType::Addition,
        }
    }
}

impl From<&DbStalePolicy> for StaleSnapshotPolicy {
    fn from(value: &DbStalePolicy) -> Self {
        match value {
            DbStalePolicy::Accept => StaleSnapshotPolicy::Accept,
            DbStalePolicy::Discard => StaleSnapshotPolicy::Discard,
        }
    }
}

pub fn config_from_descriptor(row: &ReplicationDescriptor) -> ReplicationConfig {
    ReplicationConfig {
        update_type: (&row.update_type).into(),
        sends_per_second: row.sends_per_second,
        stale_policy: (&row.stale_policy).into(),
    }
}

pub fn pose_from_row(row: &TransformSnapshot) -> Transform {
    Transform::new((&row.translation).into(), (&row.rotation).into())
}

pub fn snapshot_from_row(row: &TransformSnapshot) -> Snapshot {
    Snapshot::new(row.sequence, pose_from_row(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(sequence: u32) -> TransformSnapshot {
        TransformSnapshot {
            object_id: 4,
            sequence,
            translation: DbVec3 { x: 1.0, y: 2.0, z: -3.0 },
            rotation: DbQuat { x: 0.0, y: 0.0, z: 0.0, w: 2.0 },
        }
    }

    #[test]
    fn snapshot_row_becomes_normalized_snapshot() {
        let snapshot = snapshot_from_row(&row(9));

        assert_eq!(snapshot.sequence, 9);
        assert_relative_eq!(snapshot.transform.position, na::Vector3::new(1.0, 2.0, -3.0));
        assert_relative_eq!(snapshot.transform.orientation, na::UnitQuaternion::identity());
    }

    #[test]
    fn descriptor_row_becomes_config() {
        let config = config_from_descriptor(&ReplicationDescriptor {
            object_id: 4,
            update_type: DbUpdateType::Addition,
            sends_per_second: 30,
            stale_policy: DbStalePolicy::Discard,
        });

        assert_eq!(config.update_type, UpdateType::Addition);
        assert_eq!(config.sends_per_second, 30);
        assert_eq!(config.stale_policy, StaleSnapshotPolicy::Discard);
    }
}
