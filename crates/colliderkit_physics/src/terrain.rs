//! Terrain tiles built from height fields

use colliderkit_core::{
    ActorHandle, CollisionGroup, EntityId, FilterData, HeightFieldAsset, ShapeHandle, TerrainConfiguration,
};
use colliderkit_math::{Pose, Quat, Vec3, HALF_PI};

use crate::actors::{create_static_body, WorldBodyConfiguration};
use crate::backend::{Geometry, PhysicsBackend};
use crate::error::PhysicsError;
use crate::materials::MaterialResolver;
use crate::registry::{CollisionRegistry, MaterialRegistry};
use crate::shape::ShapeFactory;

/// A static actor holding a single terrain shape
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainBody {
    pub actor: ActorHandle,
    pub shape: ShapeHandle,
    pub collision_group: CollisionGroup,
}

/// Maps height-field axes (rows, heights, columns) onto world (y, z, x)
pub fn terrain_local_pose() -> Pose {
    Pose::from_rotation(Quat::from_rotation_z(HALF_PI) * Quat::from_rotation_x(HALF_PI))
}

/// Create the native height field for a loaded asset
///
/// Returns a copy of the asset bound to the new native object.
pub fn create_native_height_field(
    backend: &mut dyn PhysicsBackend,
    asset: &HeightFieldAsset,
) -> Result<HeightFieldAsset, PhysicsError> {
    let field = backend.create_height_field(&asset.data).ok_or_else(|| {
        PhysicsError::ResourceCreationFailed(format!(
            "{}x{} height field",
            asset.data.rows, asset.data.columns
        ))
    })?;
    Ok(asset.clone().with_native(field))
}

/// Build a terrain tile
///
/// The tile is a static actor at the origin carrying one height-field shape.
/// Nothing is left behind on failure.
pub fn create_terrain(
    backend: &mut dyn PhysicsBackend,
    materials: &dyn MaterialRegistry,
    collisions: &dyn CollisionRegistry,
    configuration: &TerrainConfiguration,
    entity: EntityId,
    name: &str,
) -> Result<TerrainBody, PhysicsError> {
    let hint = configuration.height_field_asset.hint();
    let Some(asset) = configuration.height_field_asset.get() else {
        log::warn!("Height field asset {} not ready", hint);
        return Err(PhysicsError::AssetNotReady(hint));
    };
    let Some(field) = asset.height_field() else {
        log::warn!("Height field asset {} has no height field", hint);
        return Err(PhysicsError::AssetNotReady(format!("{}: no native height field", hint)));
    };

    let material_list = MaterialResolver::new(materials).resolve_terrain(
        &configuration.surface_id_index_mapping,
        &configuration.materials_to_surface_ids,
    )?;

    let geometry = Geometry::HeightField {
        field,
        height_scale: configuration.scale.z,
        row_scale: configuration.scale.x,
        column_scale: configuration.scale.y,
    };
    if !backend.is_geometry_valid(&geometry) {
        log::warn!("Invalid height field for terrain '{}'", name);
        return Err(PhysicsError::ConfigurationInvalid(format!(
            "invalid height field geometry for terrain '{}' with scale {}",
            name, configuration.scale
        )));
    }

    let shape = backend
        .create_shape(&geometry, &material_list, true)
        .ok_or_else(|| PhysicsError::ResourceCreationFailed(format!("terrain shape '{}'", name)))?;
    backend.set_local_pose(shape, terrain_local_pose());

    let collision_group = ShapeFactory::new(materials, collisions).collision_group(&configuration.collision_group_id);
    let filter = FilterData::new(configuration.collision_layer, collision_group);
    backend.set_simulation_filter_data(shape, filter);
    backend.set_query_filter_data(shape, filter);
    backend.set_shape_name(shape, name);

    let actor = match create_static_body(backend, &WorldBodyConfiguration::new(Vec3::ZERO, entity, name)) {
        Ok(actor) => actor,
        Err(err) => {
            backend.release_shape(shape);
            return Err(err);
        }
    };
    if !backend.attach_shape(actor, shape) {
        backend.release_shape(shape);
        backend.release_actor(actor);
        return Err(PhysicsError::ResourceCreationFailed(format!(
            "could not attach terrain shape to '{}'",
            name
        )));
    }

    Ok(TerrainBody {
        actor,
        shape,
        collision_group,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CollisionGroupTable, MaterialLibrary};
    use crate::software::SoftwareBackend;
    use colliderkit_core::{
        AssetRef, CollisionGroupId, CollisionLayer, HeightFieldData, MaterialId, MaterialSelection, PhysicsMaterial,
    };

    struct Fixture {
        backend: SoftwareBackend,
        materials: MaterialLibrary,
        groups: CollisionGroupTable,
    }

    fn fixture() -> Fixture {
        let mut backend = SoftwareBackend::new();
        let mut materials = MaterialLibrary::with_default(&mut backend, &PhysicsMaterial::default()).unwrap();
        materials.register(&mut backend, "grass", &PhysicsMaterial::new(0.7, 0.6, 0.0)).unwrap();
        Fixture {
            backend,
            materials,
            groups: CollisionGroupTable::new(),
        }
    }

    fn terrain(backend: &mut SoftwareBackend) -> TerrainConfiguration {
        let asset = create_native_height_field(backend, &HeightFieldAsset::new(HeightFieldData::flat(4, 4))).unwrap();
        TerrainConfiguration::new(AssetRef::detached("island.heightfield", asset))
    }

    #[test]
    fn test_create_terrain() {
        let mut f = fixture();
        let config = terrain(&mut f.backend)
            .with_surface_material(3, MaterialSelection::single(MaterialId::new("grass")));

        let body = create_terrain(&mut f.backend, &f.materials, &f.groups, &config, EntityId(42), "Island").unwrap();

        assert_eq!(f.backend.actor_shapes(body.actor), vec![body.shape]);
        let actor = f.backend.actor(body.actor).unwrap();
        assert_eq!(actor.pose, Pose::IDENTITY);
        assert_eq!(actor.entity, EntityId(42));
        assert_eq!(actor.name, "Island");
        assert!(actor.dynamics.is_none());

        assert_eq!(f.backend.shape_name(body.shape).as_deref(), Some("Island"));
        assert_eq!(
            f.backend.shape_materials(body.shape),
            Some(vec![f.materials.get(&MaterialId::new("grass")).unwrap()])
        );
        assert_eq!(
            f.backend.simulation_filter_data(body.shape),
            Some(FilterData::new(CollisionLayer::STATIC, CollisionGroup::ALL))
        );
    }

    #[test]
    fn test_terrain_axis_remap() {
        let mut f = fixture();
        let mut config = terrain(&mut f.backend);
        config.scale = Vec3::new(2.0, 3.0, 0.5);

        let body = create_terrain(&mut f.backend, &f.materials, &f.groups, &config, EntityId(1), "Tile").unwrap();
        match f.backend.shape_geometry(body.shape) {
            Some(Geometry::HeightField {
                height_scale,
                row_scale,
                column_scale,
                ..
            }) => {
                assert_eq!(height_scale, 0.5);
                assert_eq!(row_scale, 2.0);
                assert_eq!(column_scale, 3.0);
            }
            other => panic!("Expected a height field, got {:?}", other),
        }

        let pose = f.backend.local_pose(body.shape).unwrap();
        // Heights point up world Z, rows run along world Y
        assert!(pose.transform_vector(Vec3::Y).abs_diff_eq(Vec3::Z, 1e-5));
        assert!(pose.transform_vector(Vec3::X).abs_diff_eq(Vec3::Y, 1e-5));
        assert!(pose.transform_vector(Vec3::Z).abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn test_unknown_collision_group_uses_all() {
        let mut f = fixture();
        let mut config = terrain(&mut f.backend);
        config.collision_group_id = CollisionGroupId::new("Missing");

        let body = create_terrain(&mut f.backend, &f.materials, &f.groups, &config, EntityId(1), "Tile").unwrap();
        assert_eq!(body.collision_group, CollisionGroup::ALL);
    }

    #[test]
    fn test_unready_asset() {
        let mut f = fixture();
        let config = TerrainConfiguration::new(AssetRef::unbound("later.heightfield"));
        assert_eq!(
            create_terrain(&mut f.backend, &f.materials, &f.groups, &config, EntityId(1), "Tile"),
            Err(PhysicsError::AssetNotReady("later.heightfield".to_string()))
        );
    }

    #[test]
    fn test_asset_without_native_field() {
        let mut f = fixture();
        let config = TerrainConfiguration::new(AssetRef::detached(
            "raw.heightfield",
            HeightFieldAsset::new(HeightFieldData::flat(2, 2)),
        ));
        let result = create_terrain(&mut f.backend, &f.materials, &f.groups, &config, EntityId(1), "Tile");
        assert!(matches!(result, Err(PhysicsError::AssetNotReady(_))));
    }

    #[test]
    fn test_invalid_geometry_creates_nothing() {
        let mut f = fixture();
        let mut config = terrain(&mut f.backend);
        config.scale = Vec3::new(1.0, 1.0, 0.0);

        let result = create_terrain(&mut f.backend, &f.materials, &f.groups, &config, EntityId(1), "Tile");
        assert!(matches!(result, Err(PhysicsError::ConfigurationInvalid(_))));
        assert_eq!(f.backend.shape_count(), 0);
        assert_eq!(f.backend.actor_count(), 0);
    }

    #[test]
    fn test_backend_refusal_leaves_nothing() {
        let mut f = fixture();
        let config = terrain(&mut f.backend);
        f.backend.set_refuse_creation(true);

        let result = create_terrain(&mut f.backend, &f.materials, &f.groups, &config, EntityId(1), "Tile");
        assert!(matches!(result, Err(PhysicsError::ResourceCreationFailed(_))));
        assert_eq!(f.backend.shape_count(), 0);
        assert_eq!(f.backend.actor_count(), 0);
    }
}
