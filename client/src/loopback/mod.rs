//! Single-process demo: an authority and an observer for each object, joined by a lossy link.
//!
//! Each object has two Rapier bodies in the same world. The authority body is simulated and
//! drawn as a translucent ghost. The observer body is kinematic, collider-less and only ever
//! moved by the replicated pose, so the gap between the two shows what the link costs.

mod link;

pub use link::{LinkConditions, LoopbackLink};

use crate::{
    input::DemoAction,
    physics::PhysicsWorld,
    replication::{
        ObjectDescribed, ReplicatedEntityMapping, ReplicatedObserver, ReplicationSystems,
        SnapshotReceived,
    },
    types::{apply_pose, pose_from_transform},
    world::observer_color,
};
use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use shared::{
    ReplicatedEntity, ReplicationConfig, Role, Snapshot, StaleSnapshotPolicy, UpdateType,
    rapier3d::prelude::{ColliderBuilder, RigidBodyBuilder, RigidBodyHandle, vector},
    spawn,
};

/// Packet loss pattern used when dropping is toggled on.
const DROP_EVERY: u32 = 4;
/// Reordering pattern used when it is toggled on: every Nth snapshot arrives late.
const REORDER_EVERY: u32 = 3;

const CUBE_HALF_EXTENT: f32 = 0.5;
const SPAWN_HEIGHT: f32 = 3.0;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<LinkConditions>();
    app.init_resource::<LoopbackLink>();

    app.add_systems(Startup, (spawn_demo_objects, spawn_hud));
    app.add_systems(
        Update,
        (handle_demo_actions, sample_authorities, deliver_snapshots)
            .chain()
            .before(ReplicationSystems),
    );
    app.add_systems(Update, update_hud.after(ReplicationSystems));
}

/// Authority side of one demo object. Its entity renders the ground truth.
#[derive(Component)]
pub struct Authority {
    pub object_id: u64,
    pub handle: RigidBodyHandle,
    pub role: Box<dyn ReplicatedEntity + Send + Sync>,
}

#[derive(Component)]
struct LinkHud;

struct DemoObject {
    object_id: u64,
    update_type: UpdateType,
    stale_policy: StaleSnapshotPolicy,
    x: f32,
}

const DEMO_OBJECTS: [DemoObject; 3] = [
    DemoObject {
        object_id: 1,
        update_type: UpdateType::Override,
        stale_policy: StaleSnapshotPolicy::Accept,
        x: -3.0,
    },
    DemoObject {
        object_id: 2,
        update_type: UpdateType::Addition,
        stale_policy: StaleSnapshotPolicy::Accept,
        x: 0.0,
    },
    DemoObject {
        object_id: 3,
        update_type: UpdateType::Override,
        stale_policy: StaleSnapshotPolicy::Discard,
        x: 3.0,
    },
];

fn spawn_demo_objects(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut physics: ResMut<PhysicsWorld>,
    mut described: MessageWriter<ObjectDescribed>,
) -> Result {
    physics.insert_static(
        ColliderBuilder::cuboid(25.0, 0.1, 25.0)
            .translation(vector![0.0, -0.1, 0.0])
            .build(),
    );

    let cube = meshes.add(Cuboid::from_length(CUBE_HALF_EXTENT * 2.0));

    for object in &DEMO_OBJECTS {
        let config = ReplicationConfig::default()
            .with_update_type(object.update_type)
            .with_stale_policy(object.stale_policy);
        let start = Transform::from_xyz(object.x, SPAWN_HEIGHT, 0.0);

        // The authority finds its body through its collider, like a scene entity would.
        let handle = physics.insert_body(
            RigidBodyBuilder::dynamic()
                .translation(vector![object.x, SPAWN_HEIGHT, 0.0])
                .build(),
            None,
        );
        let collider = physics.attach_collider(
            ColliderBuilder::cuboid(CUBE_HALF_EXTENT, CUBE_HALF_EXTENT, CUBE_HALF_EXTENT)
                .restitution(0.3)
                .build(),
            handle,
        );
        let body = physics.bind_body(None, Some(collider))?;
        let mut authority = spawn(Role::Authority, &config, body)?;
        authority.setup();

        commands.spawn((
            Name::new(format!("Authority {}", object.object_id)),
            Mesh3d(cube.clone()),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: observer_color(object.update_type, object.stale_policy)
                    .with_alpha(0.25),
                alpha_mode: AlphaMode::Blend,
                ..default()
            })),
            start,
            Authority {
                object_id: object.object_id,
                handle,
                role: authority,
            },
        ));

        described.write(ObjectDescribed {
            object_id: object.object_id,
            config,
            pose: pose_from_transform(&start),
        });
    }

    Ok(())
}

fn handle_demo_actions(
    actions: Res<ActionState<DemoAction>>,
    mut conditions: ResMut<LinkConditions>,
    physics: Res<PhysicsWorld>,
    authority_q: Query<&Authority>,
    mut observer_q: Query<&mut ReplicatedObserver>,
) {
    if actions.just_pressed(&DemoAction::Kick) {
        let mut bodies = physics.bodies.write();
        for authority in authority_q.iter() {
            if let Some(rb) = bodies.get_mut(authority.handle) {
                rb.apply_impulse(vector![0.0, 6.0, 0.0], true);
                rb.apply_torque_impulse(vector![0.4, 0.8, 0.2], true);
            }
        }
    }

    if actions.just_pressed(&DemoAction::ToggleDrops) {
        conditions.drop_every = if conditions.drop_every == 0 { DROP_EVERY } else { 0 };
        log::info!("Dropping every {} snapshot(s)", conditions.drop_every);
    }

    if actions.just_pressed(&DemoAction::ToggleReorder) {
        conditions.reorder_every = if conditions.reorder_every == 0 { REORDER_EVERY } else { 0 };
        log::info!("Holding back every {} snapshot(s)", conditions.reorder_every);
    }

    if actions.just_pressed(&DemoAction::CycleLatency) {
        conditions.latency = conditions.next_latency();
        log::info!("Link latency {:.0} ms", conditions.latency * 1000.0);
    }

    if actions.just_pressed(&DemoAction::ResetObservers) {
        for mut observer in observer_q.iter_mut() {
            observer.0.reset();
        }
        log::info!("Observers reset");
    }
}

/// Run every authority for this frame and hand what it sends to the link.
fn sample_authorities(
    time: Res<Time>,
    conditions: Res<LinkConditions>,
    mut link: ResMut<LoopbackLink>,
    mut authority_q: Query<(&mut Transform, &mut Authority)>,
) {
    let now = time.elapsed_secs_f64();
    let mut sent: Vec<Snapshot> = Vec::new();

    for (mut transform, mut authority) in authority_q.iter_mut() {
        authority.role.tick(now, &mut sent);
        for snapshot in sent.drain(..) {
            link.send(&conditions, now, authority.object_id, snapshot);
        }

        apply_pose(&mut transform, &authority.role.rendered_transform());
    }
}

fn deliver_snapshots(
    time: Res<Time>,
    mut link: ResMut<LoopbackLink>,
    mut writer: MessageWriter<SnapshotReceived>,
) {
    for (object_id, snapshot) in link.deliver(time.elapsed_secs_f64()) {
        writer.write(SnapshotReceived {
            object_id,
            snapshot,
        });
    }
}

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        LinkHud,
        Text::new(""),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
    ));
}

fn update_hud(
    conditions: Res<LinkConditions>,
    link: Res<LoopbackLink>,
    mapping: Res<ReplicatedEntityMapping>,
    observer_q: Query<&ReplicatedObserver>,
    mut hud: Single<&mut Text, With<LinkHud>>,
) {
    let mut lines = vec![
        format!(
            "latency {:.0} ms | drop every {} | hold back every {}",
            conditions.latency * 1000.0,
            conditions.drop_every,
            conditions.reorder_every,
        ),
        format!(
            "in flight {} | dropped {} | held back {}",
            link.in_flight(),
            link.dropped(),
            link.held_back()
        ),
        "[Space] kick  [L] latency  [D] drops  [O] reorder  [R] reset observers".to_string(),
    ];

    let mut ids: Vec<_> = mapping.0.keys().copied().collect();
    ids.sort_unstable();
    for id in ids {
        let Some(observer) = mapping.0.get(&id).and_then(|e| observer_q.get(*e).ok()) else {
            continue;
        };
        let stats = observer.0.stats();
        lines.push(format!(
            "object {id} {:?}/{:?}: received {} discarded {}",
            observer.0.update_type(),
            observer.0.stale_policy(),
            stats.received,
            stats.discarded
        ));
    }

    hud.0 = lines.join("\n");
}
