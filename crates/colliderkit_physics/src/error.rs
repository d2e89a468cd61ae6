//! Errors reported by the shape building pipeline

use colliderkit_core::{MeshKind, ShapeType};
use thiserror::Error;

/// Failure building a geometry, shape, body or cooked mesh
///
/// Failures are local: one bad collider never aborts its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhysicsError {
    /// Parameters that cannot describe a valid shape (non-positive scale, radius, ...)
    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),
    /// Shape type the operation cannot handle
    #[error("unsupported shape type: {0}")]
    UnsupportedShapeType(ShapeType),
    /// The backend refused to create an object
    #[error("failed to create native object: {0}")]
    ResourceCreationFailed(String),
    /// Referenced asset is missing or not loaded yet
    #[error("asset not ready: {0}")]
    AssetNotReady(String),
    /// Cooking returned anything other than success
    #[error("{mesh_kind:?} mesh cooking failed: {code}")]
    CookingFailed { mesh_kind: MeshKind, code: String },
    /// No material could be resolved, not even the default one
    #[error("no default material is configured")]
    MaterialUnavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = PhysicsError::CookingFailed {
            mesh_kind: MeshKind::Convex,
            code: "eZERO_AREA_TEST_FAILED".to_string(),
        };
        assert_eq!(format!("{}", err), "Convex mesh cooking failed: eZERO_AREA_TEST_FAILED");

        let err = PhysicsError::UnsupportedShapeType(ShapeType::PhysicsAsset);
        assert_eq!(format!("{}", err), "unsupported shape type: PhysicsAsset");
    }
}
