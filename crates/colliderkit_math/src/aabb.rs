//! Axis-aligned bounding boxes

use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};

use crate::Pose;

/// A 3D axis-aligned bounding box
///
/// The "null" box (min = +inf, max = -inf) is the identity for
/// [`add_aabb`](Self::add_aabb) and reports `is_valid() == false`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::NULL
    }
}

impl Aabb {
    /// Empty box that grows to fit whatever is added to it
    pub const NULL: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create a new AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Degenerate box containing a single point
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Create an AABB centered at a position with given half-extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Smallest box containing every point; `NULL` for an empty iterator
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        points.into_iter().fold(Self::NULL, |mut aabb, p| {
            aabb.add_point(p);
            aabb
        })
    }

    /// Whether min <= max on every axis
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half-extents (half the size in each dimension)
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Get the full size in each dimension
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    /// Grow to include a point
    pub fn add_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Grow to include another box; adding a null box is a no-op
    pub fn add_aabb(&mut self, other: &Aabb) {
        if !other.is_valid() {
            return;
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Check if a point is inside or on the AABB
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Translate the AABB by a delta
    pub fn translated(&self, delta: Vec3) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Scale the box about its center; a factor of 1.0 leaves it unchanged
    pub fn inflated(&self, factor: f32) -> Self {
        Self::from_center_half_extents(self.center(), self.half_extents() * factor)
    }

    /// Bounds of this box after applying a rigid pose
    pub fn transformed(&self, pose: &Pose) -> Self {
        if !self.is_valid() {
            return *self;
        }
        let rotation = Mat3::from_quat(pose.rotation);
        let abs_rotation = Mat3::from_cols(
            rotation.x_axis.abs(),
            rotation.y_axis.abs(),
            rotation.z_axis.abs(),
        );
        let center = pose.transform_point(self.center());
        let half_extents = abs_rotation * self.half_extents();
        Self::from_center_half_extents(center, half_extents)
    }

    /// Approximate equality on both corners
    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f32) -> bool {
        self.min.abs_diff_eq(other.min, max_abs_diff) && self.max.abs_diff_eq(other.max, max_abs_diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HALF_PI;
    use glam::Quat;

    #[test]
    fn test_null_is_invalid_and_identity_for_union() {
        let mut aabb = Aabb::NULL;
        assert!(!aabb.is_valid());

        let other = Aabb::new(Vec3::ZERO, Vec3::ONE);
        aabb.add_aabb(&other);
        assert_eq!(aabb, other);

        aabb.add_aabb(&Aabb::NULL);
        assert_eq!(aabb, other);
    }

    #[test]
    fn test_from_center_half_extents() {
        let aabb = Aabb::from_center_half_extents(Vec3::new(1.0, 2.0, 3.0), Vec3::splat(0.5));
        assert_eq!(aabb.min, Vec3::new(0.5, 1.5, 2.5));
        assert_eq!(aabb.max, Vec3::new(1.5, 2.5, 3.5));
        assert_eq!(aabb.center(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_from_point_is_degenerate_but_valid() {
        let aabb = Aabb::from_point(Vec3::new(3.0, -1.0, 2.0));
        assert!(aabb.is_valid());
        assert_eq!(aabb.extents(), Vec3::ZERO);
        assert!(aabb.contains(Vec3::new(3.0, -1.0, 2.0)));
    }

    #[test]
    fn test_from_points() {
        let aabb = Aabb::from_points([Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 2.0, 0.5)]);
        assert_eq!(aabb.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 0.5));

        assert!(!Aabb::from_points(std::iter::empty()).is_valid());
    }

    #[test]
    fn test_transformed_quarter_turn_swaps_extents() {
        let aabb = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::new(2.0, 1.0, 0.5));
        let pose = Pose::new(Vec3::new(0.0, 0.0, 10.0), Quat::from_rotation_z(HALF_PI));
        let result = aabb.transformed(&pose);
        let expected = Aabb::from_center_half_extents(Vec3::new(0.0, 0.0, 10.0), Vec3::new(1.0, 2.0, 0.5));
        assert!(result.abs_diff_eq(&expected, 1e-5));
    }

    #[test]
    fn test_inflated() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(2.0));
        assert_eq!(aabb.inflated(1.0), aabb);
        let doubled = aabb.inflated(2.0);
        assert_eq!(doubled.min, Vec3::splat(-1.0));
        assert_eq!(doubled.max, Vec3::splat(3.0));
    }
}
