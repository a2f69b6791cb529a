use crate::{schema::ReplicatedObject, types::to_transform};
use shared::{PhysicsBody, Transform};

/// [`PhysicsBody`] view of a `replicated_object` row.
///
/// The module has no physics engine of its own; whatever simulates the object writes its pose
/// into the row, and the authority samples it from here. Mode changes are written back to the
/// row by the caller.
#[derive(Clone, Copy, Debug)]
pub struct RowBody {
    transform: Transform,
    simulated: bool,
}

impl From<&ReplicatedObject> for RowBody {
    fn from(row: &ReplicatedObject) -> Self {
        Self {
            transform: to_transform(row.translation, row.rotation),
            simulated: row.simulated,
        }
    }
}

impl PhysicsBody for RowBody {
    fn transform(&self) -> Transform {
        self.transform
    }

    fn set_simulated(&mut self, simulated: bool) {
        self.simulated = simulated;
    }

    fn is_simulated(&self) -> bool {
        self.simulated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        schema::ReplicationDescriptor,
        types::{DbQuat, DbStalePolicy, DbUpdateType, DbVec3},
    };
    use shared::{AuthorityRole, ReplicatedEntity, Snapshot};
    use spacetimedb::Identity;

    fn row() -> ReplicatedObject {
        ReplicatedObject {
            id: 7,
            owner: Identity::ZERO,
            translation: DbVec3::new(1.0, 2.0, 3.0),
            rotation: DbQuat::IDENTITY,
            simulated: false,
            update_type: DbUpdateType::Addition,
            sends_per_second: 30,
            stale_policy: DbStalePolicy::Discard,
            next_send_secs: Some(2.0),
            next_sequence: 41,
        }
    }

    #[test]
    fn authority_resumed_from_row_samples_its_pose() {
        let row = row();
        let mut authority = AuthorityRole::resume(
            &row.replication_config(),
            RowBody::from(&row),
            row.next_send_secs,
            row.next_sequence,
        )
        .unwrap();
        let mut emitted: Vec<Snapshot> = Vec::new();

        authority.tick(1.9, &mut emitted);
        assert!(emitted.is_empty());
        assert!(authority.body().is_simulated());

        authority.tick(2.0, &mut emitted);
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].sequence, 41);
        assert_eq!(emitted[0].transform.position, nalgebra::Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(authority.next_sequence(), 42);
        assert_eq!(authority.scheduler().next_send(), Some(2.0 + 1.0 / 30.0));
    }

    #[test]
    fn descriptor_mirrors_observer_config() {
        let row = row();
        let descriptor = ReplicationDescriptor::of(&row);

        assert_eq!(descriptor.object_id, 7);
        assert_eq!(descriptor.sends_per_second, 30);
        assert_eq!(descriptor.update_type, DbUpdateType::Addition);
        assert_eq!(descriptor.stale_policy, DbStalePolicy::Discard);
        assert_eq!(
            row.replication_config().stale_policy,
            shared::StaleSnapshotPolicy::Discard
        );
    }
}
