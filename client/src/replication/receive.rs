use super::{ReplicatedEntityMapping, ReplicatedObserver, SnapshotReceived};
use bevy::prelude::*;

/// Feed every received snapshot to its observer, stamped with the current frame time.
pub(super) fn receive_snapshots(
    time: Res<Time>,
    mut messages: MessageReader<SnapshotReceived>,
    mapping: Res<ReplicatedEntityMapping>,
    mut observer_q: Query<&mut ReplicatedObserver>,
) {
    let now = time.elapsed_secs_f64();
    for msg in messages.read() {
        let Some(entity) = mapping.0.get(&msg.object_id) else {
            log::debug!("Snapshot for unknown object {}", msg.object_id);
            continue;
        };
        let Ok(mut observer) = observer_q.get_mut(*entity) else {
            continue;
        };

        observer.0.on_snapshot_received(msg.snapshot, now);
    }
}
