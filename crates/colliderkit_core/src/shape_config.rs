//! Shape and collider configurations
//!
//! [`ShapeConfiguration`] is the declarative description of a collision
//! shape: its kind, its type-specific parameters and a per-axis scale.
//! [`ColliderConfiguration`] describes how that shape is attached to a body:
//! offset, collision filtering, materials and trigger behaviour.
//!
//! Configurations are authored in the editor, stored in scenes and mesh
//! assets, and consumed read-only by the shape building pipeline. One
//! configuration may produce many native shapes over its life.

use std::sync::OnceLock;

use colliderkit_math::{Pose, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::asset_cache::AssetRef;
use crate::collision::{CollisionGroupId, CollisionLayer};
use crate::handles::MeshHandle;
use crate::material::MaterialSelection;
use crate::mesh_asset::MeshAsset;

fn default_scale() -> Vec3 {
    Vec3::ONE
}

/// Kind of baked mesh data
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshKind {
    /// Convex hull, usable on dynamic bodies
    #[default]
    Convex,
    /// Arbitrary triangle soup, static or kinematic bodies only
    Triangle,
}

/// Discriminant of [`ShapeConfiguration`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeType {
    Sphere,
    Box,
    Capsule,
    Native,
    CookedMesh,
    PhysicsAsset,
}

impl std::fmt::Display for ShapeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Sphere centered on the collider origin
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SphereShapeConfiguration {
    pub radius: f32,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
}

impl Default for SphereShapeConfiguration {
    fn default() -> Self {
        Self {
            radius: 0.5,
            scale: Vec3::ONE,
        }
    }
}

/// Box given by its full extents along each axis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxShapeConfiguration {
    pub dimensions: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
}

impl Default for BoxShapeConfiguration {
    fn default() -> Self {
        Self {
            dimensions: Vec3::ONE,
            scale: Vec3::ONE,
        }
    }
}

/// Capsule whose long axis is Z
///
/// `height` is the tip-to-tip length including both hemispherical caps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapsuleShapeConfiguration {
    pub height: f32,
    pub radius: f32,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
}

impl Default for CapsuleShapeConfiguration {
    fn default() -> Self {
        Self {
            height: 1.0,
            radius: 0.25,
            scale: Vec3::ONE,
        }
    }
}

/// Shape backed by a mesh object that already lives in the backend
///
/// The handle is runtime-only and never serialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NativeShapeConfiguration {
    #[serde(skip)]
    pub native_mesh: Option<MeshHandle>,
    /// Scale the native mesh was authored with
    #[serde(default = "default_scale")]
    pub native_scale: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
}

impl Default for NativeShapeConfiguration {
    fn default() -> Self {
        Self {
            native_mesh: None,
            native_scale: Vec3::ONE,
            scale: Vec3::ONE,
        }
    }
}

/// Shape backed by cooked mesh bytes
///
/// The native mesh created from the bytes is cached here the first time a
/// geometry is built. The cache is set at most once and only references the
/// native object: releasing the mesh is the backend owner's business.
/// Replacing the cooked bytes clears the cache.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CookedMeshShapeConfiguration {
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    cooked_data: Vec<u8>,
    mesh_kind: MeshKind,
    #[serde(skip)]
    cached_mesh: OnceLock<MeshHandle>,
}

impl Default for CookedMeshShapeConfiguration {
    fn default() -> Self {
        Self::new(Vec::new(), MeshKind::Convex)
    }
}

impl PartialEq for CookedMeshShapeConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.scale == other.scale && self.mesh_kind == other.mesh_kind && self.cooked_data == other.cooked_data
    }
}

impl CookedMeshShapeConfiguration {
    /// Create a configuration from cooked bytes
    pub fn new(cooked_data: Vec<u8>, mesh_kind: MeshKind) -> Self {
        Self {
            scale: Vec3::ONE,
            cooked_data,
            mesh_kind,
            cached_mesh: OnceLock::new(),
        }
    }

    /// Replace the cooked bytes; drops any cached native mesh
    pub fn set_cooked_mesh_data(&mut self, cooked_data: Vec<u8>, mesh_kind: MeshKind) -> Option<MeshHandle> {
        self.cooked_data = cooked_data;
        self.mesh_kind = mesh_kind;
        self.invalidate_cached_mesh()
    }

    /// The cooked bytes
    pub fn cooked_mesh_data(&self) -> &[u8] {
        &self.cooked_data
    }

    /// Kind of mesh the bytes describe
    pub fn mesh_kind(&self) -> MeshKind {
        self.mesh_kind
    }

    /// The cached native mesh, if one was created already
    pub fn cached_mesh(&self) -> Option<MeshHandle> {
        self.cached_mesh.get().copied()
    }

    /// Store a freshly created native mesh
    ///
    /// Returns the handle now held by the cache. When another build won the
    /// race this is the earlier handle, and the caller still owns `mesh`.
    pub fn cache_mesh(&self, mesh: MeshHandle) -> MeshHandle {
        *self.cached_mesh.get_or_init(|| mesh)
    }

    /// Forget the cached native mesh, returning it so the owner can release it
    pub fn invalidate_cached_mesh(&mut self) -> Option<MeshHandle> {
        self.cached_mesh.take()
    }
}

/// Reference to a mesh asset holding a list of sub-shapes
///
/// The asset expands into one collider/shape pair per sub-shape when bodies
/// are built; the expanded list is never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsAssetShapeConfiguration {
    pub asset: AssetRef<MeshAsset>,
    /// Scale authored on the asset at import time
    #[serde(default = "default_scale")]
    pub asset_scale: Vec3,
    /// Scale applied by the user on top of the asset scale
    #[serde(default = "default_scale")]
    pub scale: Vec3,
}

impl PhysicsAssetShapeConfiguration {
    /// Reference an asset with unit scales
    pub fn new(asset: AssetRef<MeshAsset>) -> Self {
        Self {
            asset,
            asset_scale: Vec3::ONE,
            scale: Vec3::ONE,
        }
    }
}

/// Declarative collision shape
///
/// In RON the variant name wraps the parameters:
/// `Sphere((radius: 0.5))`, `Box((dimensions: (1.0, 2.0, 1.0)))`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShapeConfiguration {
    Sphere(SphereShapeConfiguration),
    Box(BoxShapeConfiguration),
    Capsule(CapsuleShapeConfiguration),
    Native(NativeShapeConfiguration),
    CookedMesh(CookedMeshShapeConfiguration),
    PhysicsAsset(PhysicsAssetShapeConfiguration),
}

impl ShapeConfiguration {
    /// Sphere with unit scale
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere(SphereShapeConfiguration {
            radius,
            scale: Vec3::ONE,
        })
    }

    /// Box with the given full extents and unit scale
    pub fn cuboid(dimensions: Vec3) -> Self {
        Self::Box(BoxShapeConfiguration {
            dimensions,
            scale: Vec3::ONE,
        })
    }

    /// Z-aligned capsule with unit scale
    pub fn capsule(height: f32, radius: f32) -> Self {
        Self::Capsule(CapsuleShapeConfiguration {
            height,
            radius,
            scale: Vec3::ONE,
        })
    }

    /// Shape around a mesh already living in the backend
    pub fn native(mesh: MeshHandle) -> Self {
        Self::Native(NativeShapeConfiguration {
            native_mesh: Some(mesh),
            ..Default::default()
        })
    }

    /// Shape from cooked mesh bytes
    pub fn cooked_mesh(cooked_data: Vec<u8>, mesh_kind: MeshKind) -> Self {
        Self::CookedMesh(CookedMeshShapeConfiguration::new(cooked_data, mesh_kind))
    }

    /// Composite shape from a mesh asset
    pub fn physics_asset(asset: AssetRef<MeshAsset>) -> Self {
        Self::PhysicsAsset(PhysicsAssetShapeConfiguration::new(asset))
    }

    /// Builder-style scale override
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.set_scale(scale);
        self
    }

    /// Kind of shape
    pub fn shape_type(&self) -> ShapeType {
        match self {
            ShapeConfiguration::Sphere(_) => ShapeType::Sphere,
            ShapeConfiguration::Box(_) => ShapeType::Box,
            ShapeConfiguration::Capsule(_) => ShapeType::Capsule,
            ShapeConfiguration::Native(_) => ShapeType::Native,
            ShapeConfiguration::CookedMesh(_) => ShapeType::CookedMesh,
            ShapeConfiguration::PhysicsAsset(_) => ShapeType::PhysicsAsset,
        }
    }

    /// Per-axis scale
    pub fn scale(&self) -> Vec3 {
        match self {
            ShapeConfiguration::Sphere(c) => c.scale,
            ShapeConfiguration::Box(c) => c.scale,
            ShapeConfiguration::Capsule(c) => c.scale,
            ShapeConfiguration::Native(c) => c.scale,
            ShapeConfiguration::CookedMesh(c) => c.scale,
            ShapeConfiguration::PhysicsAsset(c) => c.scale,
        }
    }

    /// Overwrite the per-axis scale
    pub fn set_scale(&mut self, scale: Vec3) {
        match self {
            ShapeConfiguration::Sphere(c) => c.scale = scale,
            ShapeConfiguration::Box(c) => c.scale = scale,
            ShapeConfiguration::Capsule(c) => c.scale = scale,
            ShapeConfiguration::Native(c) => c.scale = scale,
            ShapeConfiguration::CookedMesh(c) => c.scale = scale,
            ShapeConfiguration::PhysicsAsset(c) => c.scale = scale,
        }
    }
}

/// How a shape is attached to its body and filtered
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColliderConfiguration {
    /// Offset from the body origin
    pub position: Vec3,
    /// Rotation relative to the body
    pub rotation: Quat,
    pub collision_layer: CollisionLayer,
    pub collision_group_id: CollisionGroupId,
    pub material_selection: MaterialSelection,
    /// Trigger shapes only report overlaps
    pub is_trigger: bool,
    /// Exclusive shapes cannot be shared between bodies
    pub is_exclusive: bool,
    pub tag: String,
    pub rest_offset: f32,
    pub contact_offset: f32,
}

impl Default for ColliderConfiguration {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            collision_layer: CollisionLayer::DEFAULT,
            collision_group_id: CollisionGroupId::all(),
            material_selection: MaterialSelection::default(),
            is_trigger: false,
            is_exclusive: true,
            tag: String::new(),
            rest_offset: 0.0,
            contact_offset: 0.02,
        }
    }
}

impl ColliderConfiguration {
    /// Set the offset from the body origin
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set the rotation relative to the body
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the collision layer
    pub fn with_layer(mut self, layer: CollisionLayer) -> Self {
        self.collision_layer = layer;
        self
    }

    /// Set the collision group
    pub fn with_group(mut self, group_id: CollisionGroupId) -> Self {
        self.collision_group_id = group_id;
        self
    }

    /// Set the material slots
    pub fn with_materials(mut self, selection: MaterialSelection) -> Self {
        self.material_selection = selection;
        self
    }

    /// Make this collider a trigger
    pub fn with_trigger(mut self, is_trigger: bool) -> Self {
        self.is_trigger = is_trigger;
        self
    }

    /// Offset of the collider relative to its body
    pub fn local_pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }
}

/// A collider and the shape it wraps
pub type ShapeConfigurationPair = (ColliderConfiguration, ShapeConfiguration);

/// Ordered list of collider/shape pairs, as produced by asset expansion
pub type ShapeConfigurationList = Vec<ShapeConfigurationPair>;

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_shape_type_and_scale() {
        let mut shape = ShapeConfiguration::capsule(2.0, 0.5);
        assert_eq!(shape.shape_type(), ShapeType::Capsule);
        assert_eq!(shape.scale(), Vec3::ONE);

        shape.set_scale(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(shape.scale(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_cooked_mesh_cache_is_set_once() {
        let mut meshes: SlotMap<MeshHandle, ()> = SlotMap::with_key();
        let first = meshes.insert(());
        let second = meshes.insert(());

        let config = CookedMeshShapeConfiguration::new(vec![1, 2, 3], MeshKind::Convex);
        assert!(config.cached_mesh().is_none());

        assert_eq!(config.cache_mesh(first), first);
        // A later store keeps the first handle
        assert_eq!(config.cache_mesh(second), first);
        assert_eq!(config.cached_mesh(), Some(first));
    }

    #[test]
    fn test_replacing_cooked_data_clears_cache() {
        let mut meshes: SlotMap<MeshHandle, ()> = SlotMap::with_key();
        let mesh = meshes.insert(());

        let mut config = CookedMeshShapeConfiguration::new(vec![1, 2, 3], MeshKind::Convex);
        config.cache_mesh(mesh);

        let dropped = config.set_cooked_mesh_data(vec![4, 5], MeshKind::Triangle);
        assert_eq!(dropped, Some(mesh));
        assert!(config.cached_mesh().is_none());
        assert_eq!(config.mesh_kind(), MeshKind::Triangle);
        assert_eq!(config.cooked_mesh_data(), &[4, 5]);
    }

    #[test]
    fn test_cooked_mesh_equality_ignores_cache() {
        let mut meshes: SlotMap<MeshHandle, ()> = SlotMap::with_key();
        let a = CookedMeshShapeConfiguration::new(vec![7; 8], MeshKind::Convex);
        let b = a.clone();
        a.cache_mesh(meshes.insert(()));
        assert_eq!(a, b);
    }

    #[test]
    fn test_collider_defaults() {
        let collider = ColliderConfiguration::default();
        assert!(!collider.is_trigger);
        assert!(collider.is_exclusive);
        assert_eq!(collider.collision_group_id, CollisionGroupId::all());
        assert_eq!(collider.local_pose(), Pose::IDENTITY);
    }

    #[test]
    fn test_shape_ron_round_trip_keeps_parameters() {
        let shape = ShapeConfiguration::cuboid(Vec3::new(1.0, 2.0, 3.0)).with_scale(Vec3::splat(2.0));
        let text = ron::to_string(&shape).unwrap();
        let back: ShapeConfiguration = ron::from_str(&text).unwrap();
        assert_eq!(back, shape);
    }
}
