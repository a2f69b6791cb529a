//! Observer side of transform replication, as a Bevy plugin.
//!
//! Transports speak to the plugin through messages only:
//! - [`ObjectDescribed`] spawns an observer entity with its own kinematic body.
//! - [`SnapshotReceived`] is routed to the entity registered in [`ReplicatedEntityMapping`].
//! - [`SendRateChanged`] retimes an observer's blend.
//! - [`ObjectRetired`] despawns the entity and removes its body.
//!
//! Every frame each [`ReplicatedObserver`] is blended and written to its `Transform`.

mod interpolate;
mod lifecycle;
mod receive;

use crate::physics::PhysicsWorld;
use bevy::{platform::collections::HashMap, prelude::*};
use shared::{ObserverRole, RapierBody, ReplicationConfig, Snapshot, Transform as Pose};

pub fn plugin(app: &mut App) {
    app.add_message::<ObjectDescribed>();
    app.add_message::<ObjectRetired>();
    app.add_message::<SendRateChanged>();
    app.add_message::<SnapshotReceived>();
    app.init_resource::<ReplicatedEntityMapping>();
    app.init_resource::<PhysicsWorld>();
    app.add_systems(
        Update,
        (
            // Retire first so a retire + describe pair in one frame rebuilds the observer.
            lifecycle::retire_observers,
            lifecycle::spawn_observers,
            lifecycle::apply_send_rates,
            receive::receive_snapshots,
            interpolate::interpolate,
        )
            .chain()
            .in_set(ReplicationSystems),
    );
}

/// Systems that consume snapshots and render observers. Transports should write
/// their messages before this set runs.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReplicationSystems;

/// An object the client should observe, with the configuration its authority was authored
/// with and the pose to start from.
#[derive(Message, Debug, Clone, Copy)]
pub struct ObjectDescribed {
    pub object_id: u64,
    pub config: ReplicationConfig,
    pub pose: Pose,
}

/// The object is gone on the authority side.
#[derive(Message, Debug, Clone, Copy)]
pub struct ObjectRetired {
    pub object_id: u64,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct SendRateChanged {
    pub object_id: u64,
    pub sends_per_second: u32,
}

/// One snapshot delivered by the transport for the object `object_id`.
#[derive(Message, Debug, Clone, Copy)]
pub struct SnapshotReceived {
    pub object_id: u64,
    pub snapshot: Snapshot,
}

/// Ties the server-side object id to the local Bevy entity that observes it.
#[derive(Resource, Default)]
pub struct ReplicatedEntityMapping(pub HashMap<u64, Entity>);

/// Observer role of one replicated object, bound to a kinematic Rapier body.
#[derive(Component)]
pub struct ReplicatedObserver(pub ObserverRole<RapierBody>);

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::time::TimeUpdateStrategy;
    use nalgebra::Vector3;
    use shared::{PhysicsBody, ReplicatedEntity, StaleSnapshotPolicy};
    use std::time::Duration;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(4)));
        app.add_plugins(plugin);
        app
    }

    fn at(x: f32) -> Pose {
        Pose::from_position(Vector3::new(x, 0.0, 0.0))
    }

    fn describe(app: &mut App, object_id: u64, config: ReplicationConfig, pose: Pose) {
        app.world_mut().write_message(ObjectDescribed {
            object_id,
            config,
            pose,
        });
        app.update();
    }

    fn observed(app: &App, object_id: u64) -> Option<Entity> {
        app.world()
            .resource::<ReplicatedEntityMapping>()
            .0
            .get(&object_id)
            .copied()
    }

    fn body_count(app: &App) -> usize {
        app.world().resource::<PhysicsWorld>().bodies.read().len()
    }

    #[test]
    fn described_object_gets_a_kinematic_observer_at_its_pose() {
        let mut app = test_app();
        describe(&mut app, 7, ReplicationConfig::default(), at(2.0));

        let entity = observed(&app, 7).unwrap();
        let observer = app.world().get::<ReplicatedObserver>(entity).unwrap();
        assert!(observer.0.is_set_up());
        assert!(!observer.0.body().is_simulated());
        assert_eq!(observer.0.rendered_transform(), at(2.0));
        assert_eq!(
            app.world().get::<Transform>(entity).unwrap().translation,
            Vec3::new(2.0, 0.0, 0.0)
        );
        assert_eq!(body_count(&app), 1);
    }

    #[test]
    fn describing_twice_keeps_one_observer() {
        let mut app = test_app();
        describe(&mut app, 7, ReplicationConfig::default(), at(0.0));
        let first = observed(&app, 7);
        describe(&mut app, 7, ReplicationConfig::default(), at(5.0));

        assert_eq!(observed(&app, 7), first);
        assert_eq!(body_count(&app), 1);
    }

    #[test]
    fn invalid_config_spawns_nothing() {
        let mut app = test_app();
        describe(
            &mut app,
            7,
            ReplicationConfig::default().with_sends_per_second(0),
            at(0.0),
        );

        assert_eq!(observed(&app, 7), None);
        assert_eq!(body_count(&app), 0);
    }

    #[test]
    fn entity_settles_on_received_pose() {
        let mut app = test_app();
        describe(&mut app, 7, ReplicationConfig::default(), at(0.0));
        let entity = observed(&app, 7).unwrap();

        let pose = Pose::from_position(Vector3::new(3.0, 1.0, 0.0));
        app.world_mut().write_message(SnapshotReceived {
            object_id: 7,
            snapshot: Snapshot::new(0, pose),
        });

        // 4 ms per frame: the blend window of 1/60 s is over after five frames.
        for _ in 0..10 {
            app.update();
        }

        let transform = app.world().get::<Transform>(entity).unwrap();
        assert_eq!(transform.translation, Vec3::new(3.0, 1.0, 0.0));

        let observer = app.world().get::<ReplicatedObserver>(entity).unwrap();
        assert_eq!(observer.0.stats().received, 1);
    }

    #[test]
    fn snapshot_in_the_same_frame_as_its_description_is_applied() {
        let mut app = test_app();
        app.world_mut().write_message(ObjectDescribed {
            object_id: 7,
            config: ReplicationConfig::default(),
            pose: at(0.0),
        });
        app.world_mut().write_message(SnapshotReceived {
            object_id: 7,
            snapshot: Snapshot::new(0, at(1.0)),
        });
        app.update();

        let entity = observed(&app, 7).unwrap();
        let observer = app.world().get::<ReplicatedObserver>(entity).unwrap();
        assert_eq!(observer.0.stats().received, 1);
        assert_eq!(observer.0.state().goal, at(1.0));
    }

    #[test]
    fn discard_observer_ignores_out_of_order_snapshots() {
        let mut app = test_app();
        let config = ReplicationConfig::default().with_stale_policy(StaleSnapshotPolicy::Discard);
        describe(&mut app, 7, config, at(0.0));
        let entity = observed(&app, 7).unwrap();

        for sequence in [0, 2, 1] {
            app.world_mut().write_message(SnapshotReceived {
                object_id: 7,
                snapshot: Snapshot::new(sequence, at(sequence as f32)),
            });
        }
        app.update();

        let observer = app.world().get::<ReplicatedObserver>(entity).unwrap();
        assert_eq!(observer.0.stats().received, 3);
        assert_eq!(observer.0.stats().discarded, 1);
        assert_eq!(observer.0.state().goal, at(2.0));
    }

    #[test]
    fn send_rate_change_retimes_the_blend() {
        let mut app = test_app();
        describe(&mut app, 7, ReplicationConfig::default(), at(0.0));
        let entity = observed(&app, 7).unwrap();

        for sends_per_second in [10, 0] {
            app.world_mut().write_message(SendRateChanged {
                object_id: 7,
                sends_per_second,
            });
            app.update();
        }

        // The zero rate was rejected; 10/s stays.
        let observer = app.world().get::<ReplicatedObserver>(entity).unwrap();
        assert_eq!(observer.0.sends_per_second(), 10);
    }

    #[test]
    fn retired_object_is_despawned_with_its_body() {
        let mut app = test_app();
        describe(&mut app, 7, ReplicationConfig::default(), at(0.0));
        let entity = observed(&app, 7).unwrap();

        app.world_mut().write_message(ObjectRetired { object_id: 7 });
        app.update();

        assert_eq!(observed(&app, 7), None);
        assert!(app.world().get_entity(entity).is_err());
        assert_eq!(body_count(&app), 0);
    }

    #[test]
    fn retire_and_describe_in_one_frame_rebuilds_the_observer() {
        let mut app = test_app();
        describe(&mut app, 7, ReplicationConfig::default(), at(0.0));
        let old = observed(&app, 7).unwrap();

        app.world_mut().write_message(ObjectRetired { object_id: 7 });
        describe(
            &mut app,
            7,
            ReplicationConfig::default().with_update_type(shared::UpdateType::Addition),
            at(1.0),
        );

        let new = observed(&app, 7).unwrap();
        assert_ne!(new, old);
        assert!(app.world().get_entity(old).is_err());
        let observer = app.world().get::<ReplicatedObserver>(new).unwrap();
        assert_eq!(observer.0.update_type(), shared::UpdateType::Addition);
        assert_eq!(body_count(&app), 1);
    }

    #[test]
    fn snapshots_for_unknown_objects_are_skipped() {
        let mut app = test_app();
        describe(&mut app, 7, ReplicationConfig::default(), at(0.0));
        let entity = observed(&app, 7).unwrap();

        app.world_mut().write_message(SnapshotReceived {
            object_id: 99,
            snapshot: Snapshot::new(0, at(5.0)),
        });
        app.update();

        let observer = app.world().get::<ReplicatedObserver>(entity).unwrap();
        assert_eq!(observer.0.stats().received, 0);
        assert_eq!(
            app.world().get::<Transform>(entity).unwrap().translation,
            Vec3::ZERO
        );
    }
}
