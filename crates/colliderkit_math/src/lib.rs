//! 3D Mathematics Library
//!
//! Vector and rotation types come from [`glam`]; this crate adds the
//! rigid-transform and bounds types used throughout colliderkit.
//!
//! ## Core Types
//!
//! - [`Vec3`] / [`Quat`] - re-exported from glam
//! - [`Pose`] - position + rotation, composed like a rigid transform
//! - [`Aabb`] - axis-aligned bounding box with an explicit "null" state

mod aabb;
mod pose;
pub mod scale;

pub use aabb::Aabb;
pub use pose::Pose;
pub use scale::is_strictly_positive;

pub use glam::{Mat3, Quat, Vec3};

/// Half of pi, used for the fixed 90° axis corrections
pub const HALF_PI: f32 = std::f32::consts::FRAC_PI_2;
