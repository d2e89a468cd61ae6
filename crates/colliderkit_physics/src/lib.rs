//! Collider shape pipeline for colliderkit
//!
//! This crate turns collider and shape configurations into backend objects:
//! - Geometry building with scale handling and a per-configuration mesh cache
//! - Material resolution through injected registries
//! - Shape creation with filtering, trigger flags and local poses
//! - Expansion of multi-shape mesh assets
//! - Mesh cooking, terrain tiles, world bounds and debug points
//!
//! [`SoftwareBackend`] is an in-memory [`PhysicsBackend`] used by tests and
//! the demo binary.

pub mod actors;
pub mod asset_shapes;
pub mod backend;
pub mod bounds;
pub mod cooking;
mod error;
pub mod geometry;
pub mod materials;
pub mod points;
pub mod registry;
pub mod scene;
pub mod shape;
pub mod software;
pub mod terrain;
#[cfg(test)]
mod test_log;

// Re-export commonly used types
pub use actors::{create_rigid_body, create_static_body, RigidBodyConfiguration, WorldBodyConfiguration};
pub use asset_shapes::{collider_shapes_from_asset, prepare_asset_meshes, try_collider_shapes_from_asset};
pub use backend::{
    ConvexCookingResult, Cooked, CookingParams, DynamicProperties, Geometry, GeometryKind, MeshScale, PhysicsBackend,
    ShapeFlags, TriangleCookingResult,
};
pub use bounds::{collider_aabb, collider_local_pose, collider_points_local_to_world, collider_world_pose, geometry_aabb};
pub use cooking::{
    cook_convex, cook_convex_to_file, cook_triangle_mesh, cook_triangle_mesh_to_file, write_cooked_mesh_to_file,
    CookToFileError, CookedMesh,
};
pub use error::PhysicsError;
pub use geometry::{cache_or_release_mesh, capsule_half_height, create_geometry};
pub use materials::MaterialResolver;
pub use points::{generate_box_points, generate_cylinder_points, generate_sphere_points};
pub use registry::{CollisionGroupTable, CollisionRegistry, MaterialLibrary, MaterialRegistry};
pub use scene::PhysicsScene;
pub use shape::{capsule_alignment, BuiltShape, ShapeFactory};
pub use software::SoftwareBackend;
pub use terrain::{create_native_height_field, create_terrain, terrain_local_pose, TerrainBody};
