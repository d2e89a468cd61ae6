//! Collider poses and world-space bounds

use colliderkit_core::{ColliderConfiguration, ShapeConfiguration};
use colliderkit_math::{Aabb, Pose, Quat, Vec3};

use crate::asset_shapes::{collider_shapes_from_asset, prepare_asset_meshes};
use crate::backend::{Geometry, GeometryKind, PhysicsBackend};
use crate::geometry::create_geometry;
use crate::shape::capsule_alignment;

/// Bounds are reported at their exact size
const BOUNDS_INFLATION: f32 = 1.0;

/// Pose of a collider relative to its body
pub fn collider_local_pose(position: Vec3, rotation: Quat) -> Pose {
    Pose::new(position, rotation)
}

/// Pose of a collider in world space
pub fn collider_world_pose(world_pose: &Pose, collider: &ColliderConfiguration) -> Pose {
    *world_pose * collider_local_pose(collider.position, collider.rotation)
}

/// Move collider-space points into world space in place
pub fn collider_points_local_to_world(points: &mut [Vec3], world_pose: &Pose, collider: &ColliderConfiguration) {
    let pose = collider_world_pose(world_pose, collider);
    for point in points.iter_mut() {
        *point = pose.transform_point(*point);
    }
}

/// World bounds of a geometry placed by a collider on a body
///
/// Capsules are rotated onto the collider's Z axis, as the shapes built for
/// them are.
pub fn geometry_aabb(
    backend: &dyn PhysicsBackend,
    geometry: &Geometry,
    world_pose: &Pose,
    collider: &ColliderConfiguration,
) -> Option<Aabb> {
    let mut pose = collider_world_pose(world_pose, collider);
    if geometry.kind() == GeometryKind::Capsule {
        pose = pose * capsule_alignment();
    }
    backend.geometry_world_bounds(geometry, &pose, BOUNDS_INFLATION)
}

/// World bounds of a collider's shape
///
/// Anything that cannot be measured yields the single-point bounds at the
/// body position. For a physics asset that includes an asset that is not
/// ready, has no sub-shapes, or has any sub-shape whose geometry fails.
pub fn collider_aabb(
    backend: &mut dyn PhysicsBackend,
    world_pose: &Pose,
    shape: &ShapeConfiguration,
    collider: &ColliderConfiguration,
) -> Aabb {
    let point_bounds = Aabb::from_point(world_pose.position);

    let ShapeConfiguration::PhysicsAsset(asset) = shape else {
        return create_geometry(backend, shape)
            .ok()
            .and_then(|geometry| geometry_aabb(backend, &geometry, world_pose, collider))
            .unwrap_or(point_bounds);
    };

    if !asset.asset.is_ready() {
        return point_bounds;
    }
    prepare_asset_meshes(backend, asset);

    let sub_shapes = collider_shapes_from_asset(asset, collider);
    if sub_shapes.is_empty() {
        return point_bounds;
    }

    let mut bounds = Aabb::NULL;
    for (mut sub_collider, sub_shape) in sub_shapes {
        sub_collider.position *= sub_shape.scale();
        let sub_bounds = create_geometry(backend, &sub_shape)
            .ok()
            .and_then(|geometry| geometry_aabb(backend, &geometry, world_pose, &sub_collider));
        match sub_bounds {
            Some(sub_bounds) => bounds.add_aabb(&sub_bounds),
            None => return point_bounds,
        }
    }
    bounds
}
