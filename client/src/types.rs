//! Conversions between the `shared` (nalgebra) math types and Bevy's.
//!
//! Both sides are foreign to this crate, so these are free functions rather than `From` impls.

use bevy::prelude::*;
use nalgebra as na;

pub fn vec3_from_na(v: &na::Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub fn na_from_vec3(v: Vec3) -> na::Vector3<f32> {
    na::Vector3::new(v.x, v.y, v.z)
}

pub fn quat_from_na(q: &na::UnitQuaternion<f32>) -> Quat {
    let q = q.into_inner();
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

pub fn na_from_quat(q: Quat) -> na::UnitQuaternion<f32> {
    na::UnitQuaternion::from_quaternion(na::Quaternion::new(q.w, q.x, q.y, q.z))
}

/// Write a replicated pose onto a Bevy `Transform`, leaving its scale untouched.
pub fn apply_pose(target: &mut Transform, pose: &shared::Transform) {
    target.translation = vec3_from_na(&pose.position);
    target.rotation = quat_from_na(&pose.orientation);
}

pub fn pose_from_transform(transform: &Transform) -> shared::Transform {
    shared::Transform::new(
        na_from_vec3(transform.translation),
        na_from_quat(transform.rotation),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pose_round_trips_through_bevy_transform() {
        let pose = shared::Transform::new(
            na::Vector3::new(1.5, -2.0, 8.0),
            na::UnitQuaternion::from_euler_angles(0.3, 1.1, -0.2),
        );
        let mut transform = Transform::from_scale(Vec3::splat(2.0));

        apply_pose(&mut transform, &pose);
        let back = pose_from_transform(&transform);

        assert_eq!(transform.scale, Vec3::splat(2.0));
        assert_relative_eq!(back.position, pose.position);
        assert_relative_eq!(back.orientation, pose.orientation, epsilon = 1.0e-5);
    }

    #[test]
    fn quaternion_component_order_matches() {
        let q = Quat::from_rotation_y(0.75);
        let na_q = na_from_quat(q);

        assert_relative_eq!(na_q.angle(), 0.75, epsilon = 1.0e-6);
        assert!(quat_from_na(&na_q).abs_diff_eq(q, 1.0e-6));
    }
}
