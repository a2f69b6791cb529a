//! Local Rapier world.
//!
//! Holds the observers' kinematic bodies and, in the loopback demo, the authority's simulated
//! ones. Observer bodies carry no colliders, so they never push the bodies they mirror.

use bevy::prelude::{App, Fixed, FixedUpdate, Res, ResMut, Resource, Time};
use shared::{
    RapierBody, ReplicationError, SharedBodySet, Transform, rapier3d::na, rapier3d::prelude::*,
    resolve_body, shared_body_set,
};

/// Physics runs at the default send rate.
const PHYSICS_HZ: f64 = 60.0;

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(Time::<Fixed>::from_hz(PHYSICS_HZ));
    app.init_resource::<PhysicsWorld>();
    app.add_systems(FixedUpdate, step_physics);
}

#[derive(Resource)]
pub struct PhysicsWorld {
    pub bodies: SharedBodySet,
    pub colliders: ColliderSet,
    pub gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self {
            bodies: shared_body_set(RigidBodySet::new()),
            colliders: ColliderSet::new(),
            gravity: vector![0.0, -9.81, 0.0],
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }
}

impl PhysicsWorld {
    pub fn insert_body(&mut self, body: RigidBody, collider: Option<Collider>) -> RigidBodyHandle {
        let mut bodies = self.bodies.write();
        let handle = bodies.insert(body);
        if let Some(collider) = collider {
            self.colliders.insert_with_parent(collider, handle, &mut bodies);
        }
        handle
    }

    pub fn attach_collider(
        &mut self,
        collider: Collider,
        parent: RigidBodyHandle,
    ) -> ColliderHandle {
        let mut bodies = self.bodies.write();
        self.colliders.insert_with_parent(collider, parent, &mut bodies)
    }

    pub fn insert_static(&mut self, collider: Collider) -> ColliderHandle {
        self.colliders.insert(collider)
    }

    /// Remove a body together with its colliders.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.write().remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Bind a replicated object to its body at authoring time.
    ///
    /// A `supplied` handle wins; otherwise the body is looked up through the object's
    /// collider. Fails with [`ReplicationError::MissingBody`] when neither leads to a body.
    pub fn bind_body(
        &self,
        supplied: Option<RigidBodyHandle>,
        collider: Option<ColliderHandle>,
    ) -> Result<RapierBody, ReplicationError> {
        let supplied = supplied
            .filter(|handle| self.bodies.read().contains(*handle))
            .map(|handle| RapierBody::new(self.bodies.clone(), handle));

        let from_collider =
            |c: ColliderHandle| RapierBody::from_collider(self.bodies.clone(), &self.colliders, c);
        resolve_body(supplied, || collider.and_then(from_collider))
    }

    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        let mut bodies = self.bodies.write();
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }
}

/// Rapier placement of a replicated pose.
pub fn rapier_pose(pose: &Transform) -> Isometry<Real> {
    let p = pose.position;
    let q = pose.orientation.into_inner();
    Isometry::from_parts(
        na::Translation3::new(p.x, p.y, p.z),
        na::UnitQuaternion::from_quaternion(na::Quaternion::new(q.w, q.i, q.j, q.k)),
    )
}

fn step_physics(time: Res<Time<Fixed>>, mut physics: ResMut<PhysicsWorld>) {
    let dt = time.delta_secs();
    if dt > 0.0 {
        physics.step(dt);
    }
}
