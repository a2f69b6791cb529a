//! Column types shared by the replication tables, plus conversions into the `shared` math types.

use nalgebra as na;
use shared::{StaleSnapshotPolicy, Transform, UpdateType};
use spacetimedb::SpacetimeType;

/// A 3D vector in world space (meters).
///
/// Data type only; math happens on `nalgebra` types after conversion.
#[derive(SpacetimeType, Debug, Clone, Copy, PartialEq)]
pub struct DbVec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for DbVec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl DbVec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<DbVec3> for na::Vector3<f32> {
    fn from(v: DbVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<na::Vector3<f32>> for DbVec3 {
    fn from(v: na::Vector3<f32>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// A unit quaternion stored as four `f32` scalars in `(x, y, z, w)` order.
#[derive(SpacetimeType, Debug, Clone, Copy, PartialEq)]
pub struct DbQuat {
    /// x component (imaginary i)
    pub x: f32,
    /// y component (imaginary j)
    pub y: f32,
    /// z component (imaginary k)
    pub z: f32,
    /// w component (real part)
    pub w: f32,
}

impl Default for DbQuat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl DbQuat {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };
}

impl DbQuat {
    /// Smallest norm still accepted as a rotation; anything shorter normalizes to NaN.
    pub const MIN_NORM: f32 = 1.0e-6;

    pub fn norm(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// True if the four components are finite and far enough from zero to normalize.
    pub fn is_valid_rotation(&self) -> bool {
        let norm = self.norm();
        norm.is_finite() && norm >= Self::MIN_NORM
    }
}

impl From<DbQuat> for na::UnitQuaternion<f32> {
    /// Renormalizes, so rows written with slightly denormalized quaternions stay usable.
    fn from(q: DbQuat) -> Self {
        na::UnitQuaternion::from_quaternion(na::Quaternion::new(q.w, q.x, q.y, q.z))
    }
}

impl From<na::UnitQuaternion<f32>> for DbQuat {
    fn from(uq: na::UnitQuaternion<f32>) -> Self {
        let q = uq.into_inner();
        DbQuat {
            x: q.i,
            y: q.j,
            z: q.k,
            w: q.w,
        }
    }
}

impl DbVec3 {
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Rejects poses that would turn into NaN snapshots once converted.
pub fn validate_pose(translation: &DbVec3, rotation: &DbQuat) -> Result<(), String> {
    if !translation.is_finite() {
        return Err(format!("Translation {translation:?} is not finite"));
    }
    if !rotation.is_valid_rotation() {
        return Err(format!("Rotation {rotation:?} is not a usable quaternion"));
    }
    Ok(())
}

/// Converts a `(translation, rotation)` column pair into a pose.
pub fn to_transform(translation: DbVec3, rotation: DbQuat) -> Transform {
    Transform::new(translation.into(), rotation.into())
}

/// Splits a pose into its `(translation, rotation)` columns.
pub fn from_transform(transform: &Transform) -> (DbVec3, DbQuat) {
    (transform.position.into(), transform.orientation.into())
}

/// Column form of [`UpdateType`], published so clients configure their observers the same way.
#[derive(SpacetimeType, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DbUpdateType {
    #[default]
    Override,
    Addition,
}

impl From<DbUpdateType> for UpdateType {
    fn from(value: DbUpdateType) -> Self {
        match value {
            DbUpdateType::Override => UpdateType::Override,
            DbUpdateType::Addition => UpdateType::Addition,
        }
    }
}

impl From<UpdateType> for DbUpdateType {
    fn from(value: UpdateType) -> Self {
        match value {
            UpdateType::Override => DbUpdateType::Override,
            UpdateType::Addition => DbUpdateType::Addition,
        }
    }
}

/// Column form of [`StaleSnapshotPolicy`].
#[derive(SpacetimeType, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DbStalePolicy {
    #[default]
    Accept,
    Discard,
}

impl From<DbStalePolicy> for StaleSnapshotPolicy {
    fn from(value: DbStalePolicy) -> Self {
        match value {
            DbStalePolicy::Accept => StaleSnapshotPolicy::Accept,
            DbStalePolicy::Discard => StaleSnapshotPolicy::Discard,
        }
    }
}

impl From<StaleSnapshotPolicy> for DbStalePolicy {
    fn from(value: StaleSnapshotPolicy) -> Self {
        match value {
            StaleSnapshotPolicy::Accept => DbStalePolicy::Accept,
            StaleSnapshotPolicy::Discard => DbStalePolicy::Discard,
        }
    }
}
