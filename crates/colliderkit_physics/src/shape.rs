//! Shape creation
//!
//! [`ShapeFactory`] turns a collider/shape configuration pair into a native
//! shape: materials, geometry, collision filtering, trigger flags and the
//! local pose relative to the owning body.

use colliderkit_core::{
    CollisionGroup, CollisionGroupId, ColliderConfiguration, FilterData, PhysicsAssetShapeConfiguration,
    ShapeConfiguration, ShapeHandle,
};
use colliderkit_math::{Pose, Quat, HALF_PI};

use crate::asset_shapes::{collider_shapes_from_asset, prepare_asset_meshes};
use crate::backend::{PhysicsBackend, ShapeFlags};
use crate::error::PhysicsError;
use crate::geometry::create_geometry;
use crate::materials::MaterialResolver;
use crate::registry::{CollisionRegistry, MaterialRegistry};

/// Rotation that turns the backend's X-aligned capsule onto the Z axis
pub fn capsule_alignment() -> Pose {
    Pose::from_rotation(Quat::from_rotation_y(HALF_PI))
}

/// A created native shape and the collision group it was assigned
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuiltShape {
    pub shape: ShapeHandle,
    pub collision_group: CollisionGroup,
}

/// Builds native shapes using injected registries
pub struct ShapeFactory<'a> {
    materials: &'a dyn MaterialRegistry,
    collisions: &'a dyn CollisionRegistry,
}

impl<'a> ShapeFactory<'a> {
    pub fn new(materials: &'a dyn MaterialRegistry, collisions: &'a dyn CollisionRegistry) -> Self {
        Self { materials, collisions }
    }

    /// Collision group for an id; unknown ids collide with everything
    pub fn collision_group(&self, id: &CollisionGroupId) -> CollisionGroup {
        self.collisions.collision_group(id).unwrap_or_else(|| {
            log::debug!("Unknown collision group '{}', using All", id.name());
            CollisionGroup::ALL
        })
    }

    /// Create one native shape
    ///
    /// Materials are resolved before any geometry is built, so a missing
    /// default material never creates a native mesh.
    pub fn create_shape(
        &self,
        backend: &mut dyn PhysicsBackend,
        collider: &ColliderConfiguration,
        configuration: &ShapeConfiguration,
    ) -> Result<BuiltShape, PhysicsError> {
        let materials = MaterialResolver::new(self.materials).resolve(&collider.material_selection)?;
        let geometry = create_geometry(backend, configuration)?;

        let shape = backend
            .create_shape(&geometry, &materials, collider.is_exclusive)
            .ok_or_else(|| {
                PhysicsError::ResourceCreationFailed(format!("backend rejected {} shape", configuration.shape_type()))
            })?;

        let collision_group = self.collision_group(&collider.collision_group_id);
        let filter = FilterData::new(collider.collision_layer, collision_group);
        backend.set_simulation_filter_data(shape, filter);
        backend.set_query_filter_data(shape, filter);
        backend.set_contact_offsets(shape, collider.rest_offset, collider.contact_offset);

        if let ShapeConfiguration::Capsule(_) = configuration {
            backend.set_local_pose(shape, capsule_alignment());
        }

        if collider.is_trigger {
            let flags = backend.shape_flags(shape).unwrap_or_default();
            let flags = (flags - ShapeFlags::SIMULATION_SHAPE - ShapeFlags::SCENE_QUERY_SHAPE) | ShapeFlags::TRIGGER_SHAPE;
            backend.set_shape_flags(shape, flags);
        }

        let current = backend.local_pose(shape).unwrap_or(Pose::IDENTITY);
        backend.set_local_pose(shape, collider.local_pose() * current);

        Ok(BuiltShape { shape, collision_group })
    }

    /// Create a shape for every sub-shape of a physics asset
    ///
    /// Each collider offset is scaled by its shape scale. Sub-shapes that
    /// fail are logged and skipped.
    pub fn create_shapes_from_asset(
        &self,
        backend: &mut dyn PhysicsBackend,
        asset_configuration: &PhysicsAssetShapeConfiguration,
        master_collider: &ColliderConfiguration,
    ) -> Vec<BuiltShape> {
        prepare_asset_meshes(backend, asset_configuration);

        let pairs = collider_shapes_from_asset(asset_configuration, master_collider);
        let mut shapes = Vec::with_capacity(pairs.len());
        for (index, (mut collider, shape)) in pairs.into_iter().enumerate() {
            collider.position *= shape.scale();
            match self.create_shape(backend, &collider, &shape) {
                Ok(built) => shapes.push(built),
                Err(err) => log::warn!(
                    "Skipping sub-shape {} of {}: {}",
                    index,
                    asset_configuration.asset.hint(),
                    err
                ),
            }
        }
        shapes
    }

    /// Create every shape a collider describes, expanding physics assets
    pub fn create_shapes(
        &self,
        backend: &mut dyn PhysicsBackend,
        collider: &ColliderConfiguration,
        configuration: &ShapeConfiguration,
    ) -> Result<Vec<BuiltShape>, PhysicsError> {
        match configuration {
            ShapeConfiguration::PhysicsAsset(asset) => {
                if !asset.asset.is_ready() {
                    return Err(PhysicsError::AssetNotReady(asset.asset.hint()));
                }
                Ok(self.create_shapes_from_asset(backend, asset, collider))
            }
            _ => Ok(vec![self.create_shape(backend, collider, configuration)?]),
        }
    }
}
