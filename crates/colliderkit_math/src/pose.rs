//! Rigid pose (position, rotation)
//!
//! A Pose places a shape or a body in 3D space. Unlike an entity transform it
//! carries no scale: scale is baked into geometry when shapes are built.

use std::ops::Mul;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A rigid transform with position and rotation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Translation
    pub position: Vec3,
    /// Orientation as a unit quaternion
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    /// No translation, no rotation
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Create a pose from a position and rotation
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Create a pose with just a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Create a pose with just a rotation
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation,
        }
    }

    /// Transform a point from local space to the parent space
    ///
    /// Applies rotation, then translation.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation * p + self.position
    }

    /// Transform a direction (rotation only)
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.rotation * v
    }

    /// Compute the inverse pose
    ///
    /// `pose.inverse().transform_point(pose.transform_point(p)) == p`
    pub fn inverse(&self) -> Self {
        let inv_rotation = self.rotation.inverse();
        Self {
            position: inv_rotation * -self.position,
            rotation: inv_rotation,
        }
    }

    /// Compose two poses: result = self * other
    ///
    /// The composed pose applies `other` first, then `self`.
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            position: self.transform_point(other.position),
            rotation: self.rotation * other.rotation,
        }
    }

    /// Same pose with a renormalized rotation
    pub fn normalized(&self) -> Self {
        Self {
            position: self.position,
            rotation: self.rotation.normalize(),
        }
    }

    /// Whether every component is finite
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }

    /// Approximate equality, used by tests and change detection
    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f32) -> bool {
        self.position.abs_diff_eq(other.position, max_abs_diff)
            && (self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
                || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff))
    }
}

impl Mul for Pose {
    type Output = Pose;

    fn mul(self, rhs: Pose) -> Pose {
        self.compose(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HALF_PI;

    const EPSILON: f32 = 1e-5;

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, EPSILON)
    }

    #[test]
    fn test_identity() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Pose::IDENTITY.transform_point(p), p);
        assert_eq!(Pose::default(), Pose::IDENTITY);
    }

    #[test]
    fn test_transform_point_rotates_then_translates() {
        let pose = Pose::new(Vec3::new(0.0, 0.0, 5.0), Quat::from_rotation_z(HALF_PI));
        let result = pose.transform_point(Vec3::X);
        assert!(vec_approx_eq(result, Vec3::new(0.0, 1.0, 5.0)));
    }

    #[test]
    fn test_inverse_round_trip() {
        let pose = Pose::new(
            Vec3::new(1.0, -2.0, 3.0),
            Quat::from_rotation_y(0.7) * Quat::from_rotation_x(0.3),
        );
        let p = Vec3::new(4.0, 5.0, 6.0);
        let back = pose.inverse().transform_point(pose.transform_point(p));
        assert!(vec_approx_eq(back, p));
    }

    #[test]
    fn test_compose_applies_right_first() {
        let offset = Pose::from_position(Vec3::new(1.0, 0.0, 0.0));
        let turn = Pose::from_rotation(Quat::from_rotation_z(HALF_PI));

        // Rotate first, then offset
        let composed = offset * turn;
        assert!(vec_approx_eq(composed.transform_point(Vec3::X), Vec3::new(1.0, 1.0, 0.0)));

        // Offset first, then rotate
        let composed = turn * offset;
        assert!(vec_approx_eq(composed.transform_point(Vec3::X), Vec3::new(0.0, 2.0, 0.0)));
    }

    #[test]
    fn test_abs_diff_eq_accepts_negated_quaternion() {
        let a = Pose::from_rotation(Quat::from_rotation_x(0.5));
        let b = Pose::from_rotation(-Quat::from_rotation_x(0.5));
        assert!(a.abs_diff_eq(&b, EPSILON));
    }
}
