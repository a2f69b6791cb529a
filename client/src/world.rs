use crate::replication::{ReplicatedObserver, ReplicationSystems};
use bevy::prelude::*;
use shared::{StaleSnapshotPolicy, UpdateType};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, setup);
    app.add_systems(Update, decorate_observers.after(ReplicationSystems));
}

/// One color per replication mode, shared by observers and their authority ghosts.
pub fn observer_color(update_type: UpdateType, stale_policy: StaleSnapshotPolicy) -> Color {
    match (update_type, stale_policy) {
        (UpdateType::Override, StaleSnapshotPolicy::Accept) => Color::srgb(0.9, 0.45, 0.2),
        (UpdateType::Override, StaleSnapshotPolicy::Discard) => Color::srgb(0.85, 0.2, 0.55),
        (UpdateType::Addition, _) => Color::srgb(0.25, 0.55, 0.9),
    }
}

/// Give freshly spawned observers something to draw, whichever transport described them.
fn decorate_observers(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    observer_q: Query<(Entity, &ReplicatedObserver), Added<ReplicatedObserver>>,
) {
    for (entity, observer) in observer_q.iter() {
        let color = observer_color(observer.0.update_type(), observer.0.stale_policy());
        commands.entity(entity).insert((
            Mesh3d(meshes.add(Cuboid::from_length(1.0))),
            MeshMaterial3d(materials.add(color)),
        ));
    }
}

/// Ground plane and light. The ground collider lives with the demo physics world.
fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    log::info!("World setup");

    commands.spawn((
        Name::new("Ground"),
        Transform::from_xyz(0., 0., 0.),
        Mesh3d(meshes.add(Plane3d::default().mesh().size(50., 50.).build())),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::linear_rgb(0.2, 0.3, 0.25),
            perceptual_roughness: 1.0,
            metallic: 0.0,
            ..default()
        })),
    ));

    commands.spawn((
        PointLight {
            shadows_enabled: true,
            intensity: 2_000_000.0,
            range: 40.0,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0),
    ));
}
