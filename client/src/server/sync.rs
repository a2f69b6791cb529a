use super::{
    SpacetimeDB,
    types::{config_from_descriptor, pose_from_row, snapshot_from_row},
};
use crate::{
    module_bindings::{ReplicationDescriptor, TransformSnapshot, TransformSnapshotTableAccess},
    replication::{
        ObjectDescribed, ObjectRetired, ReplicationSystems, SendRateChanged, SnapshotReceived,
    },
};
use bevy::prelude::*;
use bevy_spacetimedb::{ReadDeleteMessage, ReadInsertMessage, ReadUpdateMessage};
use spacetimedb_sdk::Table;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (
            on_descriptor_inserted,
            on_descriptor_updated,
            on_descriptor_deleted,
            on_snapshot_inserted,
            on_snapshot_updated,
        )
            .chain()
            .before(ReplicationSystems),
    );
}

/// A new descriptor spawns its observer at the latest published pose, if one is cached yet.
fn on_descriptor_inserted(
    mut msgs: ReadInsertMessage<ReplicationDescriptor>,
    stdb: SpacetimeDB,
    mut described: MessageWriter<ObjectDescribed>,
) {
    for msg in msgs.read() {
        let object_id = msg.row.object_id;
        let pose = cached_pose(&stdb, object_id);

        log::debug!("Descriptor inserted for object {object_id}");
        described.write(ObjectDescribed {
            object_id,
            config: config_from_descriptor(&msg.row),
            pose,
        });
    }
}

/// Rate changes retime the running observer. Any other change rebuilds it.
fn on_descriptor_updated(
    mut msgs: ReadUpdateMessage<ReplicationDescriptor>,
    stdb: SpacetimeDB,
    mut described: MessageWriter<ObjectDescribed>,
    mut retired: MessageWriter<ObjectRetired>,
    mut rate_changed: MessageWriter<SendRateChanged>,
) {
    for msg in msgs.read() {
        let object_id = msg.new.object_id;
        let old = config_from_descriptor(&msg.old);
        let new = config_from_descriptor(&msg.new);

        if old.update_type == new.update_type && old.stale_policy == new.stale_policy {
            if old.sends_per_second != new.sends_per_second {
                rate_changed.write(SendRateChanged {
                    object_id,
                    sends_per_second: new.sends_per_second,
                });
            }
            continue;
        }

        log::info!("Object {object_id} changed replication mode; rebuilding its observer");
        let pose = cached_pose(&stdb, object_id);
        retired.write(ObjectRetired { object_id });
        described.write(ObjectDescribed {
            object_id,
            config: new,
            pose,
        });
    }
}

/// Latest published pose of the object, or identity when no snapshot row is cached yet.
fn cached_pose(stdb: &SpacetimeDB, object_id: u64) -> shared::Transform {
    stdb.db()
        .transform_snapshot()
        .iter()
        .find(|row| row.object_id == object_id)
        .map(|row| pose_from_row(&row))
        .unwrap_or_else(shared::Transform::identity)
}

fn on_descriptor_deleted(
    mut msgs: ReadDeleteMessage<ReplicationDescriptor>,
    mut retired: MessageWriter<ObjectRetired>,
) {
    for msg in msgs.read() {
        log::debug!("Descriptor deleted for object {}", msg.row.object_id);
        retired.write(ObjectRetired {
            object_id: msg.row.object_id,
        });
    }
}

fn on_snapshot_inserted(
    mut msgs: ReadInsertMessage<TransformSnapshot>,
    mut writer: MessageWriter<SnapshotReceived>,
) {
    for msg in msgs.read() {
        writer.write(SnapshotReceived {
            object_id: msg.row.object_id,
            snapshot: snapshot_from_row(&msg.row),
        });
    }
}

fn on_snapshot_updated(
    mut msgs: ReadUpdateMessage<TransformSnapshot>,
    mut writer: MessageWriter<SnapshotReceived>,
) {
    for msg in msgs.read() {
        writer.write(SnapshotReceived {
            object_id: msg.new.object_id,
            snapshot: snapshot_from_row(&msg.new),
        });
    }
}
