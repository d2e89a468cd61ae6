//! Mesh cooking
//!
//! Cooking turns raw vertices into the backend's baked mesh format. The
//! result can be kept in memory as a shape configuration or written out as a
//! single-shape mesh asset.

use std::path::Path;

use colliderkit_core::{AssetError, MeshAssetData, MeshKind, ShapeConfiguration};
use colliderkit_math::Vec3;

use crate::backend::{ConvexCookingResult, PhysicsBackend, TriangleCookingResult};
use crate::error::PhysicsError;

/// Successfully cooked mesh bytes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CookedMesh {
    pub data: Vec<u8>,
    pub mesh_kind: MeshKind,
}

impl CookedMesh {
    /// Shape configuration that builds this mesh on demand
    pub fn into_shape_configuration(self) -> ShapeConfiguration {
        ShapeConfiguration::cooked_mesh(self.data, self.mesh_kind)
    }

    /// Wrap the bytes in a single-shape mesh asset
    pub fn into_asset_data(self) -> MeshAssetData {
        MeshAssetData::from_cooked_mesh(self.data, self.mesh_kind)
    }
}

/// Cook a convex hull around a point cloud
pub fn cook_convex(backend: &mut dyn PhysicsBackend, points: &[Vec3]) -> Result<CookedMesh, PhysicsError> {
    let cooked = backend.cook_convex_mesh(points);
    if cooked.result != ConvexCookingResult::Success {
        log::error!(
            "Convex cooking of {} points failed: {}",
            points.len(),
            cooked.result.description()
        );
        return Err(PhysicsError::CookingFailed {
            mesh_kind: MeshKind::Convex,
            code: cooked.result.description().to_string(),
        });
    }
    Ok(CookedMesh {
        data: cooked.data,
        mesh_kind: MeshKind::Convex,
    })
}

/// Cook a triangle mesh
///
/// An index count that is not a multiple of three is reported, and the
/// trailing indices are ignored.
pub fn cook_triangle_mesh(
    backend: &mut dyn PhysicsBackend,
    points: &[Vec3],
    indices: &[u32],
) -> Result<CookedMesh, PhysicsError> {
    if indices.len() % 3 != 0 {
        log::error!(
            "Triangle mesh index count {} is not a multiple of 3, cooking {} triangles",
            indices.len(),
            indices.len() / 3
        );
    }
    let whole_triangles = &indices[..indices.len() / 3 * 3];

    let cooked = backend.cook_triangle_mesh(points, whole_triangles);
    if cooked.result != TriangleCookingResult::Success {
        log::error!(
            "Triangle mesh cooking of {} triangles failed: {}",
            whole_triangles.len() / 3,
            cooked.result.description()
        );
        return Err(PhysicsError::CookingFailed {
            mesh_kind: MeshKind::Triangle,
            code: cooked.result.description().to_string(),
        });
    }
    Ok(CookedMesh {
        data: cooked.data,
        mesh_kind: MeshKind::Triangle,
    })
}

/// Save cooked bytes as a single-shape mesh asset
pub fn write_cooked_mesh_to_file<P: AsRef<Path>>(
    path: P,
    cooked_data: &[u8],
    mesh_kind: MeshKind,
) -> Result<(), AssetError> {
    MeshAssetData::from_cooked_mesh(cooked_data.to_vec(), mesh_kind).save(path)
}

/// Failure of a cook-and-save call
#[derive(Debug, thiserror::Error)]
pub enum CookToFileError {
    #[error(transparent)]
    Cooking(#[from] PhysicsError),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// Cook a convex hull and save it as a mesh asset
pub fn cook_convex_to_file<P: AsRef<Path>>(
    backend: &mut dyn PhysicsBackend,
    path: P,
    points: &[Vec3],
) -> Result<(), CookToFileError> {
    let cooked = cook_convex(backend, points)?;
    cooked.into_asset_data().save(path)?;
    Ok(())
}

/// Cook a triangle mesh and save it as a mesh asset
pub fn cook_triangle_mesh_to_file<P: AsRef<Path>>(
    backend: &mut dyn PhysicsBackend,
    path: P,
    points: &[Vec3],
    indices: &[u32],
) -> Result<(), CookToFileError> {
    let cooked = cook_triangle_mesh(backend, points, indices)?;
    cooked.into_asset_data().save(path)?;
    Ok(())
}
