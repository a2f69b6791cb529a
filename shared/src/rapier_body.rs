//! Rapier adapter for [`PhysicsBody`].
//!
//! Rapier keeps bodies in a `RigidBodySet` addressed by handle, while a replicated object wants
//! to own "its" body. [`RapierBody`] bridges the two by pairing a handle with a shared, locked
//! body set. The host that steps the physics pipeline holds the same [`SharedBodySet`].
//!
//! Simulation mode maps onto Rapier body types:
//! - simulated: `RigidBodyType::Dynamic` (forces and contacts integrate the body)
//! - not simulated: `RigidBodyType::KinematicPositionBased` (the pose is written from outside)

use crate::{body::PhysicsBody, transform::Transform};
use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use parking_lot::RwLock;
use rapier3d::prelude::*;
use std::sync::Arc;

pub type SharedBodySet = Arc<RwLock<RigidBodySet>>;

pub fn shared_body_set(bodies: RigidBodySet) -> SharedBodySet {
    Arc::new(RwLock::new(bodies))
}

#[derive(Clone)]
pub struct RapierBody {
    bodies: SharedBodySet,
    handle: RigidBodyHandle,
}

impl RapierBody {
    pub fn new(bodies: SharedBodySet, handle: RigidBodyHandle) -> Self {
        Self { bodies, handle }
    }

    /// Resolve the body a collider is attached to, the way an entity looks up its own body.
    pub fn from_collider(
        bodies: SharedBodySet,
        colliders: &ColliderSet,
        collider: ColliderHandle,
    ) -> Option<Self> {
        let handle = colliders.get(collider)?.parent()?;
        if !bodies.read().contains(handle) {
            return None;
        }
        Some(Self::new(bodies, handle))
    }

    pub fn handle(&self) -> RigidBodyHandle {
        self.handle
    }

    /// Push a rendered pose onto a kinematic body. It reaches that pose on the next step.
    ///
    /// No-op for simulated bodies: physics owns their pose.
    pub fn drive_kinematic(&self, transform: &Transform) {
        let mut bodies = self.bodies.write();
        let Some(rb) = bodies.get_mut(self.handle) else {
            return;
        };
        if !rb.is_kinematic() {
            return;
        }

        let p = transform.position;
        let q = transform.orientation.into_inner();
        rb.set_next_kinematic_translation(vector![p.x, p.y, p.z]);
        rb.set_next_kinematic_rotation(rapier3d::na::UnitQuaternion::from_quaternion(
            rapier3d::na::Quaternion::new(q.w, q.i, q.j, q.k),
        ));
    }
}

impl PhysicsBody for RapierBody {
    fn transform(&self) -> Transform {
        let bodies = self.bodies.read();
        let Some(rb) = bodies.get(self.handle) else {
            log::warn!("rigid body {:?} no longer exists", self.handle);
            return Transform::identity();
        };

        let t = rb.translation();
        let q = rb.rotation().into_inner();
        Transform::new(
            Vector3::new(t.x, t.y, t.z),
            UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.i, q.j, q.k)),
        )
    }

    fn set_simulated(&mut self, simulated: bool) {
        let mut bodies = self.bodies.write();
        let Some(rb) = bodies.get_mut(self.handle) else {
            log::warn!("rigid body {:?} no longer exists", self.handle);
            return;
        };

        let body_type = if simulated {
            RigidBodyType::Dynamic
        } else {
            RigidBodyType::KinematicPositionBased
        };
        rb.set_body_type(body_type, true);
    }

    fn is_simulated(&self) -> bool {
        self.bodies
            .read()
            .get(self.handle)
            .is_some_and(|rb| rb.is_dynamic())
    }
}
