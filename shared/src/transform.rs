use crate::constants::SLERP_EPSILON;
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

/// World-space pose of a replicated object: position in meters plus a unit orientation.
///
/// Value type with no identity of its own. Both snapshots and the observer's interpolation
/// endpoints are plain `Transform`s.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Origin, no rotation.
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
        }
    }

    pub const fn new(position: Vector3<f32>, orientation: UnitQuaternion<f32>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            orientation: UnitQuaternion::identity(),
        }
    }

    /// Blend from `self` toward `goal`.
    ///
    /// Position is linearly interpolated, orientation is spherically interpolated along the
    /// shortest arc. `fraction` is clamped to `[0, 1]`, so the result never overshoots `goal`.
    pub fn blend(&self, goal: &Transform, fraction: f32) -> Transform {
        let t = if fraction.is_nan() {
            1.0
        } else {
            fraction.clamp(0.0, 1.0)
        };

        // Exact endpoints keep a settled blend bit-identical to its target.
        if t <= 0.0 {
            return *self;
        }
        if t >= 1.0 {
            return *goal;
        }

        let position = self.position.lerp(&goal.position, t);
        let orientation = self
            .orientation
            .try_slerp(&goal.orientation, t, SLERP_EPSILON)
            .unwrap_or_else(|| self.orientation.nlerp(&goal.orientation, t));

        Transform {
            position,
            orientation,
        }
    }

    /// Angle in radians between the two orientations.
    pub fn angle_to(&self, other: &Transform) -> f32 {
        self.orientation.angle_to(&other.orientation)
    }
}

impl From<Isometry3<f32>> for Transform {
    fn from(iso: Isometry3<f32>) -> Self {
        Self {
            position: iso.translation.vector,
            orientation: iso.rotation,
        }
    }
}

impl From<Transform> for Isometry3<f32> {
    fn from(t: Transform) -> Self {
        Isometry3::from_parts(Translation3::from(t.position), t.orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn yaw(radians: f32) -> UnitQuaternion<f32> {
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), radians)
    }

    #[test]
    fn blend_endpoints_are_exact() {
        let a = Transform::new(Vector3::new(1.0, 2.0, 3.0), yaw(0.3));
        let b = Transform::new(Vector3::new(-4.0, 0.5, 9.0), yaw(1.2));

        assert_eq!(a.blend(&b, 0.0), a);
        assert_eq!(a.blend(&b, 1.0), b);
    }

    #[test]
    fn blend_halfway_lerps_position_and_slerps_orientation() {
        let a = Transform::new(Vector3::new(0.0, 0.0, 0.0), yaw(0.0));
        let b = Transform::new(Vector3::new(2.0, 4.0, -2.0), yaw(FRAC_PI_2));

        let mid = a.blend(&b, 0.5);

        assert_relative_eq!(mid.position, Vector3::new(1.0, 2.0, -1.0), epsilon = 1.0e-6);
        assert_relative_eq!(mid.orientation.angle(), FRAC_PI_2 / 2.0, epsilon = 1.0e-5);
        assert_relative_eq!(mid.angle_to(&a), mid.angle_to(&b), epsilon = 1.0e-5);
    }

    #[test]
    fn blend_clamps_out_of_range_fractions() {
        let a = Transform::from_position(Vector3::new(0.0, 0.0, 0.0));
        let b = Transform::from_position(Vector3::new(1.0, 0.0, 0.0));

        assert_eq!(a.blend(&b, -3.0), a);
        assert_eq!(a.blend(&b, 7.5), b);
        assert_eq!(a.blend(&b, f32::NAN), b);
    }

    #[test]
    fn blend_handles_half_turn_without_panicking() {
        let a = Transform::new(Vector3::zeros(), yaw(0.0));
        let b = Transform::new(Vector3::zeros(), yaw(PI));

        let mid = a.blend(&b, 0.5);

        assert!(mid.orientation.into_inner().norm().is_finite());
        assert_relative_eq!(mid.orientation.into_inner().norm(), 1.0, epsilon = 1.0e-5);
    }

    #[test]
    fn isometry_conversion_preserves_pose() {
        let t = Transform::new(Vector3::new(3.0, -1.0, 0.25), yaw(0.7));
        let iso: Isometry3<f32> = t.into();

        assert_eq!(Transform::from(iso), t);
    }
}
