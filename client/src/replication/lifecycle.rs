use super::{
    ObjectDescribed, ObjectRetired, ReplicatedEntityMapping, ReplicatedObserver, SendRateChanged,
};
use crate::{
    physics::{PhysicsWorld, rapier_pose},
    types::apply_pose,
};
use bevy::prelude::*;
use shared::{
    ObserverRole, ReplicatedEntity, ReplicationError, rapier3d::prelude::RigidBodyBuilder,
};

pub(super) fn spawn_observers(
    mut commands: Commands,
    mut messages: MessageReader<ObjectDescribed>,
    mut physics: ResMut<PhysicsWorld>,
    mut mapping: ResMut<ReplicatedEntityMapping>,
) {
    for msg in messages.read() {
        if mapping.0.contains_key(&msg.object_id) {
            log::debug!("Object {} is already observed", msg.object_id);
            continue;
        }

        match spawn_observer(&mut commands, &mut physics, msg) {
            Ok(entity) => {
                mapping.0.insert(msg.object_id, entity);
                log::info!(
                    "Observing object {} ({:?}, {} sends/s, {:?})",
                    msg.object_id,
                    msg.config.update_type,
                    msg.config.sends_per_second,
                    msg.config.stale_policy
                );
            }
            Err(e) => log::warn!("Cannot observe object {}: {e}", msg.object_id),
        }
    }
}

/// Give the object a collider-less body at its described pose and bind an observer to it.
fn spawn_observer(
    commands: &mut Commands,
    physics: &mut PhysicsWorld,
    described: &ObjectDescribed,
) -> Result<Entity, ReplicationError> {
    described.config.validate()?;

    let handle = physics.insert_body(
        RigidBodyBuilder::dynamic()
            .position(rapier_pose(&described.pose))
            .build(),
        None,
    );
    let bound = physics
        .bind_body(Some(handle), None)
        .and_then(|body| ObserverRole::new(&described.config, body));
    let mut observer = match bound {
        Ok(observer) => observer,
        Err(e) => {
            physics.remove_body(handle);
            return Err(e);
        }
    };
    observer.setup();

    let mut transform = Transform::default();
    apply_pose(&mut transform, &observer.rendered_transform());

    Ok(commands
        .spawn((
            Name::new(format!("Observer {}", described.object_id)),
            transform,
            ReplicatedObserver(observer),
        ))
        .id())
}

pub(super) fn retire_observers(
    mut commands: Commands,
    mut messages: MessageReader<ObjectRetired>,
    mut physics: ResMut<PhysicsWorld>,
    mut mapping: ResMut<ReplicatedEntityMapping>,
    observer_q: Query<&ReplicatedObserver>,
) {
    for msg in messages.read() {
        let Some(entity) = mapping.0.remove(&msg.object_id) else {
            continue;
        };
        if let Ok(observer) = observer_q.get(entity) {
            physics.remove_body(observer.0.body().handle());
        }
        commands.entity(entity).despawn();
        log::info!("Stopped observing object {}", msg.object_id);
    }
}

pub(super) fn apply_send_rates(
    mut messages: MessageReader<SendRateChanged>,
    mapping: Res<ReplicatedEntityMapping>,
    mut observer_q: Query<&mut ReplicatedObserver>,
) {
    for msg in messages.read() {
        let Some(mut observer) = mapping
            .0
            .get(&msg.object_id)
            .and_then(|entity| observer_q.get_mut(*entity).ok())
        else {
            continue;
        };

        if let Err(e) = observer.0.set_sends_per_second(msg.sends_per_second) {
            log::warn!("Ignoring send rate for object {}: {e}", msg.object_id);
        }
    }
}
