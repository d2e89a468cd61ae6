//! Geometry building
//!
//! Converts a [`ShapeConfiguration`] into a backend [`Geometry`], applying the
//! per-axis scale. Spheres and capsule radii can only scale uniformly and use
//! the largest relevant scale component.

use colliderkit_core::{CookedMeshShapeConfiguration, MeshHandle, MeshKind, ShapeConfiguration, ShapeType};
use colliderkit_math::{is_strictly_positive, Vec3};

use crate::backend::{Geometry, MeshScale, PhysicsBackend};
use crate::error::PhysicsError;

/// Build the native geometry for a shape configuration
///
/// Cooked mesh shapes create their native mesh on first use and cache it in
/// the configuration; later builds reuse the cached mesh.
///
/// # Errors
///
/// - [`PhysicsError::ConfigurationInvalid`] for non-positive scale or parameters
/// - [`PhysicsError::ResourceCreationFailed`] when a native mesh is missing or
///   cannot be created
/// - [`PhysicsError::UnsupportedShapeType`] for physics assets, which must be
///   expanded into their sub-shapes first
pub fn create_geometry(
    backend: &mut dyn PhysicsBackend,
    configuration: &ShapeConfiguration,
) -> Result<Geometry, PhysicsError> {
    let scale = configuration.scale();
    if !is_strictly_positive(scale) {
        return Err(PhysicsError::ConfigurationInvalid(format!(
            "{} scale must be positive on every axis, got {}",
            configuration.shape_type(),
            scale
        )));
    }

    match configuration {
        ShapeConfiguration::Sphere(sphere) => {
            let radius = sphere.radius * scale.max_element();
            if !(radius > 0.0) {
                return Err(PhysicsError::ConfigurationInvalid(format!(
                    "sphere radius must be positive, got {}",
                    sphere.radius
                )));
            }
            Ok(Geometry::Sphere { radius })
        }
        ShapeConfiguration::Box(cuboid) => {
            let half_extents = cuboid.dimensions * 0.5 * scale;
            if !is_strictly_positive(half_extents) {
                return Err(PhysicsError::ConfigurationInvalid(format!(
                    "box dimensions must be positive, got {}",
                    cuboid.dimensions
                )));
            }
            Ok(Geometry::Box { half_extents })
        }
        ShapeConfiguration::Capsule(capsule) => {
            let height = capsule.height * scale.z;
            let radius = capsule.radius * scale.x.max(scale.y);
            if !(height > 0.0) || !(radius > 0.0) {
                return Err(PhysicsError::ConfigurationInvalid(format!(
                    "capsule height and radius must be positive, got height {} radius {}",
                    capsule.height, capsule.radius
                )));
            }
            Ok(Geometry::Capsule {
                radius,
                half_height: capsule_half_height(height, radius),
            })
        }
        ShapeConfiguration::Native(native) => {
            let mesh = native
                .native_mesh
                .ok_or_else(|| PhysicsError::ResourceCreationFailed("mesh data is null".to_string()))?;
            mesh_geometry(backend, mesh, native.native_scale * scale)
        }
        ShapeConfiguration::CookedMesh(cooked) => {
            let mesh = match cooked.cached_mesh() {
                Some(mesh) => mesh,
                None => {
                    let created = native_mesh_from_cooked_data(backend, cooked.cooked_mesh_data(), cooked.mesh_kind())?;
                    cache_or_release_mesh(backend, cooked, created)
                }
            };
            mesh_geometry(backend, mesh, scale)
        }
        ShapeConfiguration::PhysicsAsset(_) => {
            debug_assert!(
                false,
                "physics asset shapes are a collection of shapes and must be expanded before building geometry"
            );
            Err(PhysicsError::UnsupportedShapeType(ShapeType::PhysicsAsset))
        }
    }
}

/// Distance from the capsule centre to each cap centre
///
/// A capsule shorter than its diameter degenerates to a sphere; the half
/// height is clamped to a tiny positive value so the geometry stays valid.
pub fn capsule_half_height(height: f32, radius: f32) -> f32 {
    let half_height = 0.5 * height - radius;
    if half_height > 0.0 {
        return half_height;
    }
    if half_height < 0.0 {
        log::warn!(
            "Capsule height {} must exceed twice the radius {}; using a sphere-like capsule",
            height,
            radius
        );
    }
    f32::EPSILON
}

/// Geometry for an existing native mesh, dispatched on the mesh kind
pub fn mesh_geometry(backend: &dyn PhysicsBackend, mesh: MeshHandle, scale: Vec3) -> Result<Geometry, PhysicsError> {
    let kind = backend
        .mesh_kind(mesh)
        .ok_or_else(|| PhysicsError::ResourceCreationFailed("mesh data is null".to_string()))?;
    let scale = MeshScale::new(scale);
    Ok(match kind {
        MeshKind::Triangle => Geometry::TriangleMesh { mesh, scale },
        MeshKind::Convex => Geometry::ConvexMesh { mesh, scale },
    })
}

/// Create a native mesh from cooked bytes
pub fn native_mesh_from_cooked_data(
    backend: &mut dyn PhysicsBackend,
    cooked_data: &[u8],
    mesh_kind: MeshKind,
) -> Result<MeshHandle, PhysicsError> {
    backend.create_mesh(cooked_data, mesh_kind).ok_or_else(|| {
        PhysicsError::ResourceCreationFailed(format!(
            "could not create a {:?} mesh from {} bytes of cooked data",
            mesh_kind,
            cooked_data.len()
        ))
    })
}

/// Store a freshly created mesh in the configuration's cache
///
/// Returns the cached mesh. If another build cached its mesh first, `created`
/// is released and the earlier mesh wins.
pub fn cache_or_release_mesh(
    backend: &mut dyn PhysicsBackend,
    cooked: &CookedMeshShapeConfiguration,
    created: MeshHandle,
) -> MeshHandle {
    let cached = cooked.cache_mesh(created);
    if cached != created {
        backend.release_mesh(created);
    }
    cached
}
