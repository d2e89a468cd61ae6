//! Physics backend abstraction
//!
//! [`PhysicsBackend`] is the boundary between the shape building pipeline
//! and the engine that owns native objects. Creation calls return `None`
//! when the backend refuses, mirroring a native SDK handing back null; the
//! pipeline turns that into a [`PhysicsError`](crate::PhysicsError).
//!
//! Every handle returned by a `create_*` call must be released exactly once,
//! either directly or by releasing the actor it was attached to.

use bitflags::bitflags;
use colliderkit_core::{
    ActorHandle, EntityId, FilterData, HeightFieldData, HeightFieldHandle, MaterialHandle, MeshHandle, MeshKind,
    PhysicsMaterial, ShapeHandle,
};
use colliderkit_math::{Aabb, Pose, Quat, Vec3};

/// Scale applied to a mesh at instancing time
///
/// `rotation` orients the scaling axes; identity scales along the mesh axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshScale {
    pub scale: Vec3,
    pub rotation: Quat,
}

impl Default for MeshScale {
    fn default() -> Self {
        Self::new(Vec3::ONE)
    }
}

impl MeshScale {
    /// Axis-aligned scale
    pub fn new(scale: Vec3) -> Self {
        Self {
            scale,
            rotation: Quat::IDENTITY,
        }
    }

    /// Scale a mesh-space vertex
    pub fn apply(&self, vertex: Vec3) -> Vec3 {
        let inv = self.rotation.conjugate();
        self.rotation * (self.scale * (inv * vertex))
    }
}

/// Native geometry description
///
/// Capsules follow the backend convention of lying along local X.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Geometry {
    Sphere {
        radius: f32,
    },
    Box {
        half_extents: Vec3,
    },
    Capsule {
        radius: f32,
        half_height: f32,
    },
    ConvexMesh {
        mesh: MeshHandle,
        scale: MeshScale,
    },
    TriangleMesh {
        mesh: MeshHandle,
        scale: MeshScale,
    },
    HeightField {
        field: HeightFieldHandle,
        height_scale: f32,
        row_scale: f32,
        column_scale: f32,
    },
}

/// Discriminant of [`Geometry`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Sphere,
    Box,
    Capsule,
    ConvexMesh,
    TriangleMesh,
    HeightField,
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Sphere { .. } => GeometryKind::Sphere,
            Geometry::Box { .. } => GeometryKind::Box,
            Geometry::Capsule { .. } => GeometryKind::Capsule,
            Geometry::ConvexMesh { .. } => GeometryKind::ConvexMesh,
            Geometry::TriangleMesh { .. } => GeometryKind::TriangleMesh,
            Geometry::HeightField { .. } => GeometryKind::HeightField,
        }
    }
}

bitflags! {
    /// How a shape takes part in the simulation
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ShapeFlags: u8 {
        /// Generates contacts
        const SIMULATION_SHAPE = 1 << 0;
        /// Visible to raycasts and overlap queries
        const SCENE_QUERY_SHAPE = 1 << 1;
        /// Reports overlaps without generating contacts
        const TRIGGER_SHAPE = 1 << 2;
        /// Drawn by debug visualization
        const VISUALIZATION = 1 << 3;
    }
}

impl Default for ShapeFlags {
    fn default() -> Self {
        Self::SIMULATION_SHAPE | Self::SCENE_QUERY_SHAPE | Self::VISUALIZATION
    }
}

/// Outcome of convex hull cooking
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvexCookingResult {
    Success,
    /// Input points span no volume
    ZeroAreaTestFailed,
    /// Hull would exceed the vertex limit
    PolygonsLimitReached,
    Failure,
}

impl ConvexCookingResult {
    /// Name used in diagnostics
    pub fn description(&self) -> &'static str {
        match self {
            ConvexCookingResult::Success => "eSUCCESS",
            ConvexCookingResult::ZeroAreaTestFailed => "eZERO_AREA_TEST_FAILED",
            ConvexCookingResult::PolygonsLimitReached => "ePOLYGONS_LIMIT_REACHED",
            ConvexCookingResult::Failure => "eFAILURE",
        }
    }
}

/// Outcome of triangle mesh cooking
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriangleCookingResult {
    Success,
    /// A triangle exceeds the size limit
    LargeTriangle,
    Failure,
}

impl TriangleCookingResult {
    /// Name used in diagnostics
    pub fn description(&self) -> &'static str {
        match self {
            TriangleCookingResult::Success => "eSUCCESS",
            TriangleCookingResult::LargeTriangle => "eLARGE_TRIANGLE",
            TriangleCookingResult::Failure => "eFAILURE",
        }
    }
}

/// Cooking result code with the produced bytes (empty unless successful)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cooked<R> {
    pub result: R,
    pub data: Vec<u8>,
}

/// Limits applied while cooking
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CookingParams {
    /// Most vertices a convex hull may have
    pub max_convex_vertices: u32,
    /// Longest allowed triangle edge
    pub max_triangle_edge: f32,
}

impl Default for CookingParams {
    fn default() -> Self {
        Self {
            max_convex_vertices: 255,
            max_triangle_edge: 500.0,
        }
    }
}

/// Simulation properties of a dynamic actor
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DynamicProperties {
    pub mass: f32,
    pub sleep_threshold: f32,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Centre of mass relative to the actor origin
    pub center_of_mass_offset: Vec3,
    pub kinematic: bool,
    pub max_angular_velocity: f32,
}

/// Native physics engine
pub trait PhysicsBackend {
    /// Cooking limits in effect
    fn cooking_params(&self) -> CookingParams;

    // Materials

    fn create_material(&mut self, material: &PhysicsMaterial) -> Option<MaterialHandle>;
    fn material(&self, handle: MaterialHandle) -> Option<PhysicsMaterial>;

    // Meshes

    /// Cook a convex hull from a point cloud
    fn cook_convex_mesh(&mut self, points: &[Vec3]) -> Cooked<ConvexCookingResult>;
    /// Cook a triangle mesh; `indices` holds whole triangles only
    fn cook_triangle_mesh(&mut self, points: &[Vec3], indices: &[u32]) -> Cooked<TriangleCookingResult>;
    /// Create a native mesh from cooked bytes of the given kind
    fn create_mesh(&mut self, cooked: &[u8], kind: MeshKind) -> Option<MeshHandle>;
    fn mesh_kind(&self, mesh: MeshHandle) -> Option<MeshKind>;
    fn release_mesh(&mut self, mesh: MeshHandle);

    // Height fields

    fn create_height_field(&mut self, data: &HeightFieldData) -> Option<HeightFieldHandle>;
    fn release_height_field(&mut self, field: HeightFieldHandle);

    // Geometry queries

    fn is_geometry_valid(&self, geometry: &Geometry) -> bool;
    /// World bounds of a geometry at a pose, scaled about the centre by `inflation`
    fn geometry_world_bounds(&self, geometry: &Geometry, pose: &Pose, inflation: f32) -> Option<Aabb>;

    // Shapes

    fn create_shape(&mut self, geometry: &Geometry, materials: &[MaterialHandle], exclusive: bool) -> Option<ShapeHandle>;
    fn shape_geometry(&self, shape: ShapeHandle) -> Option<Geometry>;
    fn shape_materials(&self, shape: ShapeHandle) -> Option<Vec<MaterialHandle>>;
    fn set_simulation_filter_data(&mut self, shape: ShapeHandle, filter: FilterData);
    fn simulation_filter_data(&self, shape: ShapeHandle) -> Option<FilterData>;
    fn set_query_filter_data(&mut self, shape: ShapeHandle, filter: FilterData);
    fn query_filter_data(&self, shape: ShapeHandle) -> Option<FilterData>;
    fn set_shape_flags(&mut self, shape: ShapeHandle, flags: ShapeFlags);
    fn shape_flags(&self, shape: ShapeHandle) -> Option<ShapeFlags>;
    fn set_contact_offsets(&mut self, shape: ShapeHandle, rest_offset: f32, contact_offset: f32);
    fn local_pose(&self, shape: ShapeHandle) -> Option<Pose>;
    fn set_local_pose(&mut self, shape: ShapeHandle, pose: Pose);
    fn set_shape_name(&mut self, shape: ShapeHandle, name: &str);
    fn shape_name(&self, shape: ShapeHandle) -> Option<String>;
    fn release_shape(&mut self, shape: ShapeHandle);

    // Actors

    fn create_static_actor(&mut self, pose: Pose, entity: EntityId, name: &str) -> Option<ActorHandle>;
    fn create_dynamic_actor(
        &mut self,
        pose: Pose,
        entity: EntityId,
        name: &str,
        properties: &DynamicProperties,
    ) -> Option<ActorHandle>;
    /// Attach a shape; the actor takes ownership and releases it with itself
    fn attach_shape(&mut self, actor: ActorHandle, shape: ShapeHandle) -> bool;
    fn actor_pose(&self, actor: ActorHandle) -> Option<Pose>;
    fn actor_shapes(&self, actor: ActorHandle) -> Vec<ShapeHandle>;
    /// Release an actor and every shape attached to it
    fn release_actor(&mut self, actor: ActorHandle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use colliderkit_math::HALF_PI;

    #[test]
    fn test_cooking_descriptions() {
        assert_eq!(ConvexCookingResult::Success.description(), "eSUCCESS");
        assert_eq!(
            ConvexCookingResult::PolygonsLimitReached.description(),
            "ePOLYGONS_LIMIT_REACHED"
        );
        assert_eq!(TriangleCookingResult::LargeTriangle.description(), "eLARGE_TRIANGLE");
        assert_eq!(TriangleCookingResult::Failure.description(), "eFAILURE");
    }

    #[test]
    fn test_default_shape_flags() {
        let flags = ShapeFlags::default();
        assert!(flags.contains(ShapeFlags::SIMULATION_SHAPE | ShapeFlags::SCENE_QUERY_SHAPE));
        assert!(!flags.contains(ShapeFlags::TRIGGER_SHAPE));
    }

    #[test]
    fn test_mesh_scale_apply() {
        let scale = MeshScale::new(Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(scale.apply(Vec3::ONE), Vec3::new(2.0, 3.0, 4.0));

        // Scaling axes rotated a quarter turn about Z swap the x and y factors
        let rotated = MeshScale {
            scale: Vec3::new(2.0, 1.0, 1.0),
            rotation: Quat::from_rotation_z(HALF_PI),
        };
        assert!(rotated.apply(Vec3::Y).abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5));
    }
}
