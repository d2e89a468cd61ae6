//! SceneBuilder - builds a collider scene into a physics backend
//!
//! Registers the scene's materials and collision groups, resolves mesh and
//! height-field assets through the asset cache, then creates an actor per
//! body and per terrain tile.

use std::path::{Path, PathBuf};

use colliderkit_core::{
    Aabb, ActorHandle, AssetCache, AssetHandle, AssetRef, BodyKind, BodyTemplate, ColliderScene, EntityId, HeightFieldAsset,
    MeshAsset, MeshHandle, PhysicsMaterial, ShapeConfiguration, TerrainTemplate, Vec3,
};
use colliderkit_physics::{
    collider_aabb, create_native_height_field, create_rigid_body, create_static_body, create_terrain, BuiltShape,
    CollisionGroupTable, MaterialLibrary, PhysicsBackend, PhysicsError, PhysicsScene, RigidBodyConfiguration,
    ShapeFactory, WorldBodyConfiguration,
};

/// A body created from a scene
#[derive(Clone, Debug, PartialEq)]
pub struct BuiltBody {
    pub name: String,
    pub entity: EntityId,
    pub actor: ActorHandle,
    pub shapes: Vec<BuiltShape>,
    /// World bounds of every collider, including ones that failed to build
    pub bounds: Aabb,
}

/// Result of building a scene
#[derive(Debug)]
pub struct BuiltScene {
    pub name: String,
    pub scene: PhysicsScene,
    pub materials: MaterialLibrary,
    pub collision_groups: CollisionGroupTable,
    pub bodies: Vec<BuiltBody>,
    /// Cache entries this scene is registered as a dependent of
    pub mesh_assets: Vec<AssetHandle>,
    pub height_fields: Vec<AssetHandle>,
}

impl BuiltScene {
    /// Release every actor, then drop the scene's claim on its assets
    ///
    /// Assets no other scene depends on are collected from the cache, and
    /// their native meshes and height fields are released. Returns the
    /// number of collected cache entries.
    pub fn release(self, backend: &mut dyn PhysicsBackend, assets: &mut AssetCache) -> usize {
        for actor in self.scene.actors() {
            self.scene.release_actor(backend, actor);
        }

        for handle in &self.mesh_assets {
            assets.remove_dependent(handle, &self.name);
            if !is_unused(assets, handle) {
                continue;
            }
            if let Some(asset) = assets.get::<MeshAsset>(handle) {
                for (_, shape) in &asset.data.collider_shapes {
                    if let Some(mesh) = cached_mesh(shape) {
                        backend.release_mesh(mesh);
                    }
                }
            }
        }
        for handle in &self.height_fields {
            assets.remove_dependent(handle, &self.name);
            if !is_unused(assets, handle) {
                continue;
            }
            if let Some(field) = assets.get::<HeightFieldAsset>(handle).and_then(|asset| asset.height_field()) {
                backend.release_height_field(field);
            }
        }

        let collected = assets.gc();
        log::info!("Released scene '{}'; collected {} asset(s)", self.name, collected);
        collected
    }
}

fn is_unused(assets: &AssetCache, handle: &AssetHandle) -> bool {
    assets.dependents(handle).is_some_and(|dependents| dependents.is_empty())
}

fn cached_mesh(shape: &ShapeConfiguration) -> Option<MeshHandle> {
    match shape {
        ShapeConfiguration::CookedMesh(cooked) => cooked.cached_mesh(),
        _ => None,
    }
}

/// Error that prevents a scene from being built at all
#[derive(Debug, thiserror::Error)]
pub enum SceneBuildError {
    #[error("Failed to set up scene '{scene}': {source}")]
    Setup {
        scene: String,
        #[source]
        source: PhysicsError,
    },
}

/// Builder for constructing a physics scene from a [`ColliderScene`]
///
/// # Example
/// ```ignore
/// let built = SceneBuilder::new(&mut backend, &mut assets)
///     .with_default_material(PhysicsMaterial::default())
///     .with_asset_root("assets")
///     .build(&scene)?;
/// ```
pub struct SceneBuilder<'a> {
    backend: &'a mut dyn PhysicsBackend,
    assets: &'a mut AssetCache,
    default_material: PhysicsMaterial,
    asset_root: PathBuf,
}

impl<'a> SceneBuilder<'a> {
    /// Create a new scene builder
    pub fn new(backend: &'a mut dyn PhysicsBackend, assets: &'a mut AssetCache) -> Self {
        Self {
            backend,
            assets,
            default_material: PhysicsMaterial::default(),
            asset_root: PathBuf::new(),
        }
    }

    /// Set the material used when a collider selects none
    pub fn with_default_material(mut self, material: PhysicsMaterial) -> Self {
        self.default_material = material;
        self
    }

    /// Set the directory asset paths are relative to
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    /// Build every body and terrain tile of a scene
    ///
    /// Only material setup failures abort the build. A collider that fails is
    /// logged and skipped; a body or tile that fails is logged and left out.
    pub fn build(self, scene: &ColliderScene) -> Result<BuiltScene, SceneBuildError> {
        let Self {
            backend,
            assets,
            default_material,
            asset_root,
        } = self;
        let setup_error = |source| SceneBuildError::Setup {
            scene: scene.name.clone(),
            source,
        };

        let mut materials = MaterialLibrary::with_default(backend, &default_material).map_err(setup_error)?;
        for (name, material) in &scene.materials {
            materials.register(backend, name, material).map_err(setup_error)?;
        }

        let mut collision_groups = CollisionGroupTable::new();
        for (name, layers) in &scene.collision_groups {
            collision_groups.insert_layers(name, layers);
        }

        let factory = ShapeFactory::new(&materials, &collision_groups);
        let physics_scene = PhysicsScene::new();
        let mut bodies = Vec::with_capacity(scene.bodies.len());
        let mut mesh_assets = Vec::new();
        let mut height_fields = Vec::new();
        let mut next_entity = 1;

        for template in &scene.bodies {
            let entity = EntityId(next_entity);
            next_entity += 1;

            let mut template = template.clone();
            resolve_body_assets(assets, &asset_root, &scene.name, &mut template, &mut mesh_assets);

            match build_body(backend, &factory, &template, entity) {
                Ok(body) => {
                    physics_scene.add_actor(body.actor);
                    bodies.push(body);
                }
                Err(err) => log::warn!("Skipping body '{}': {}", template.name, err),
            }
        }

        for template in &scene.terrain {
            let entity = EntityId(next_entity);
            next_entity += 1;

            let mut template = template.clone();
            resolve_terrain_asset(backend, assets, &asset_root, &scene.name, &mut template, &mut height_fields);

            match create_terrain(
                backend,
                &materials,
                &collision_groups,
                &template.configuration,
                entity,
                &template.name,
            ) {
                Ok(terrain) => {
                    physics_scene.add_actor(terrain.actor);
                    let bounds = backend
                        .shape_geometry(terrain.shape)
                        .zip(backend.local_pose(terrain.shape))
                        .and_then(|(geometry, pose)| backend.geometry_world_bounds(&geometry, &pose, 1.0))
                        .unwrap_or_else(|| Aabb::from_point(Vec3::ZERO));
                    bodies.push(BuiltBody {
                        name: template.name.clone(),
                        entity,
                        actor: terrain.actor,
                        shapes: vec![BuiltShape {
                            shape: terrain.shape,
                            collision_group: terrain.collision_group,
                        }],
                        bounds,
                    });
                }
                Err(err) => log::warn!("Skipping terrain '{}': {}", template.name, err),
            }
        }

        log::info!(
            "Built scene '{}': {} of {} bodies",
            scene.name,
            bodies.len(),
            scene.bodies.len() + scene.terrain.len()
        );

        Ok(BuiltScene {
            name: scene.name.clone(),
            scene: physics_scene,
            materials,
            collision_groups,
            bodies,
            mesh_assets,
            height_fields,
        })
    }
}

fn track(handles: &mut Vec<AssetHandle>, handle: &AssetHandle) {
    if !handles.contains(handle) {
        handles.push(handle.clone());
    }
}

fn asset_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Bind the body's physics asset references to loaded cache entries
fn resolve_body_assets(
    assets: &mut AssetCache,
    root: &Path,
    scene_name: &str,
    body: &mut BodyTemplate,
    tracked: &mut Vec<AssetHandle>,
) {
    for template in &mut body.colliders {
        let ShapeConfiguration::PhysicsAsset(asset) = &mut template.shape else {
            continue;
        };
        if asset.asset.is_ready() {
            continue;
        }
        match assets.load::<MeshAsset>(asset_path(root, asset.asset.path())) {
            Ok(loaded) => {
                assets.add_dependent(loaded.handle(), scene_name);
                track(tracked, loaded.handle());
                asset.asset = loaded;
            }
            Err(err) => log::warn!("Failed to load mesh asset {}: {}", asset.asset.hint(), err),
        }
    }
}

/// Load the tile's height field and create its native object
fn resolve_terrain_asset(
    backend: &mut dyn PhysicsBackend,
    assets: &mut AssetCache,
    root: &Path,
    scene_name: &str,
    terrain: &mut TerrainTemplate,
    tracked: &mut Vec<AssetHandle>,
) {
    let reference = &mut terrain.configuration.height_field_asset;
    if reference.get().is_some_and(|asset| asset.height_field().is_some()) {
        return;
    }

    let path = asset_path(root, reference.path());
    let loaded: AssetRef<HeightFieldAsset> = match assets.load(&path) {
        Ok(loaded) => loaded,
        Err(err) => {
            log::warn!("Failed to load height field {}: {}", reference.hint(), err);
            return;
        }
    };
    let Some(data) = loaded.get() else {
        return;
    };
    if data.height_field().is_none() {
        match create_native_height_field(backend, &data) {
            Ok(bound) => {
                if let Err(err) = assets.insert(&path, bound) {
                    log::warn!("Failed to store height field {}: {}", reference.hint(), err);
                    return;
                }
            }
            Err(err) => {
                log::warn!("Failed to create height field {}: {}", reference.hint(), err);
                return;
            }
        }
    }
    assets.add_dependent(loaded.handle(), scene_name);
    track(tracked, loaded.handle());
    *reference = loaded;
}

fn build_body(
    backend: &mut dyn PhysicsBackend,
    factory: &ShapeFactory<'_>,
    template: &BodyTemplate,
    entity: EntityId,
) -> Result<BuiltBody, PhysicsError> {
    let world = WorldBodyConfiguration::new(template.position, entity, template.name.clone())
        .with_orientation(template.rotation);
    let actor = match template.kind {
        BodyKind::Static => create_static_body(backend, &world)?,
        BodyKind::Dynamic | BodyKind::Kinematic => {
            let config = RigidBodyConfiguration::new(world.clone())
                .with_mass(template.mass)
                .with_kinematic(template.kind == BodyKind::Kinematic);
            create_rigid_body(backend, &config)?
        }
    };

    let pose = world.pose();
    let mut shapes = Vec::new();
    let mut bounds = Aabb::NULL;
    for (index, collider) in template.colliders.iter().enumerate() {
        bounds.add_aabb(&collider_aabb(backend, &pose, &collider.shape, &collider.collider));

        let built = match factory.create_shapes(backend, &collider.collider, &collider.shape) {
            Ok(built) => built,
            Err(err) => {
                log::warn!("Body '{}' collider {}: {}", template.name, index, err);
                continue;
            }
        };
        for shape in built {
            if backend.attach_shape(actor, shape.shape) {
                shapes.push(shape);
            } else {
                log::warn!(
                    "Body '{}' collider {}: shape cannot be attached to a {:?} body",
                    template.name,
                    index,
                    template.kind
                );
                backend.release_shape(shape.shape);
            }
        }
    }

    if shapes.is_empty() && !template.colliders.is_empty() {
        log::warn!("Body '{}' has no usable colliders", template.name);
    }
    if !bounds.is_valid() {
        bounds = Aabb::from_point(pose.position);
    }

    Ok(BuiltBody {
        name: template.name.clone(),
        entity,
        actor,
        shapes,
        bounds,
    })
}
