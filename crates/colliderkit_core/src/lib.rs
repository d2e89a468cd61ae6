//! Core data model for colliderkit
//!
//! This crate holds everything that describes colliders without touching a
//! physics backend:
//!
//! - [`ShapeConfiguration`] / [`ColliderConfiguration`] - declarative shapes and their attachment
//! - [`MaterialSelection`] / [`PhysicsMaterial`] - material slots and properties
//! - [`CollisionLayer`] / [`CollisionGroup`] / [`FilterData`] - collision filtering
//! - [`AssetCache`] / [`AssetRef`] - asset loading with readiness tracking
//! - [`MeshAssetData`] / [`HeightFieldAsset`] - baked mesh and terrain assets
//! - [`ColliderScene`] / [`SceneValidator`] - loadable collider scenes
//! - Handles ([`MeshHandle`], [`ShapeHandle`], ...) to backend-owned objects

pub mod asset_cache;
pub mod asset_error;
mod collision;
mod handles;
mod height_field;
mod material;
pub mod mesh_asset;
mod scene;
pub mod scene_validator;
mod shape_config;

pub use asset_cache::{Asset, AssetCache, AssetHandle, AssetId, AssetRef, AssetStatus};
pub use asset_error::AssetError;
pub use collision::{CollisionGroup, CollisionGroupId, CollisionLayer, FilterData, MAX_COLLISION_LAYERS};
pub use handles::{ActorHandle, EntityId, HeightFieldHandle, MaterialHandle, MeshHandle, ShapeHandle};
pub use height_field::{HeightFieldAsset, HeightFieldData, HeightFieldSample, TerrainConfiguration};
pub use material::{MaterialId, MaterialSelection, PhysicsMaterial};
pub use mesh_asset::{
    read_file, AssetColliderConfiguration, AssetShapePair, MeshAsset, MeshAssetData, TRIANGLE_MESH_MATERIAL_INDEX,
};
pub use scene::{BodyKind, BodyTemplate, ColliderScene, ColliderTemplate, SceneLoadError, SceneSaveError, TerrainTemplate};
pub use scene_validator::{SceneValidator, ValidationError};
pub use shape_config::{
    BoxShapeConfiguration, CapsuleShapeConfiguration, ColliderConfiguration, CookedMeshShapeConfiguration, MeshKind,
    NativeShapeConfiguration, PhysicsAssetShapeConfiguration, ShapeConfiguration, ShapeConfigurationList,
    ShapeConfigurationPair, ShapeType, SphereShapeConfiguration,
};

// Re-export commonly used math types for convenience
pub use colliderkit_math::{Aabb, Pose, Quat, Vec3};
