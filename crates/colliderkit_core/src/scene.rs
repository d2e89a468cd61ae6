//! Collider scene serialization
//!
//! Provides [`ColliderScene`] for loading/saving static collider scenes from
//! RON files. A scene lists bodies with their collider/shape pairs, terrain
//! tiles, and the named materials and collision groups they refer to.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use colliderkit_math::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::height_field::TerrainConfiguration;
use crate::material::PhysicsMaterial;
use crate::shape_config::{ColliderConfiguration, ShapeConfiguration};

/// How a body moves
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Never moves
    #[default]
    Static,
    /// Simulated
    Dynamic,
    /// Moved by code, pushes dynamic bodies
    Kinematic,
}

/// A collider and its shape as authored in a scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColliderTemplate {
    #[serde(default)]
    pub collider: ColliderConfiguration,
    pub shape: ShapeConfiguration,
}

impl ColliderTemplate {
    pub fn new(collider: ColliderConfiguration, shape: ShapeConfiguration) -> Self {
        Self { collider, shape }
    }
}

fn default_mass() -> f32 {
    1.0
}

/// A body to build into the physics scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyTemplate {
    pub name: String,
    #[serde(default)]
    pub kind: BodyKind,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    /// Ignored for static bodies
    #[serde(default = "default_mass")]
    pub mass: f32,
    #[serde(default)]
    pub colliders: Vec<ColliderTemplate>,
}

impl BodyTemplate {
    /// Create a static body at the origin
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: BodyKind::Static,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            mass: default_mass(),
            colliders: Vec::new(),
        }
    }

    /// Set the body kind
    pub fn with_kind(mut self, kind: BodyKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the world position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set the body mass
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Add a collider
    pub fn with_collider(mut self, collider: ColliderConfiguration, shape: ShapeConfiguration) -> Self {
        self.colliders.push(ColliderTemplate::new(collider, shape));
        self
    }
}

/// A terrain tile in a scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainTemplate {
    pub name: String,
    pub configuration: TerrainConfiguration,
}

/// A serializable collider scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColliderScene {
    /// Scene name (for display/debugging)
    pub name: String,
    #[serde(default)]
    pub bodies: Vec<BodyTemplate>,
    #[serde(default)]
    pub terrain: Vec<TerrainTemplate>,
    /// Named materials available to colliders
    #[serde(default)]
    pub materials: BTreeMap<String, PhysicsMaterial>,
    /// Named collision groups, as the list of layer indices each one accepts
    #[serde(default)]
    pub collision_groups: BTreeMap<String, Vec<u8>>,
}

impl ColliderScene {
    /// Create a new empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bodies: Vec::new(),
            terrain: Vec::new(),
            materials: BTreeMap::new(),
            collision_groups: BTreeMap::new(),
        }
    }

    /// Load a scene from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneLoadError> {
        let contents = fs::read_to_string(path)?;
        let scene = ron::from_str(&contents)?;
        Ok(scene)
    }

    /// Save a scene to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneSaveError> {
        let pretty = ron::ser::PrettyConfig::new().enumerate_arrays(false);
        let contents = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Add a body to this scene
    pub fn add_body(&mut self, body: BodyTemplate) {
        self.bodies.push(body);
    }

    /// Register a named material
    pub fn with_material(mut self, name: impl Into<String>, material: PhysicsMaterial) -> Self {
        self.materials.insert(name.into(), material);
        self
    }

    /// Register a named collision group
    pub fn with_collision_group(mut self, name: impl Into<String>, layers: Vec<u8>) -> Self {
        self.collision_groups.insert(name.into(), layers);
        self
    }

    /// Total number of collider/shape pairs across all bodies
    pub fn collider_count(&self) -> usize {
        self.bodies.iter().map(|b| b.colliders.len()).sum()
    }
}

/// Error loading a scene
#[derive(Debug, Error)]
pub enum SceneLoadError {
    /// IO error (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Parse error (invalid RON syntax)
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Error saving a scene
#[derive(Debug, Error)]
pub enum SceneSaveError {
    /// IO error (permission denied, disk full, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Serialization error
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionGroupId;
    use crate::material::{MaterialId, MaterialSelection};
    use crate::shape_config::ShapeType;

    #[test]
    fn test_scene_new() {
        let scene = ColliderScene::new("Test Scene");
        assert_eq!(scene.name, "Test Scene");
        assert!(scene.bodies.is_empty());
        assert!(scene.terrain.is_empty());
        assert_eq!(scene.collider_count(), 0);
    }

    #[test]
    fn test_body_builder() {
        let body = BodyTemplate::new("crate")
            .with_kind(BodyKind::Dynamic)
            .with_position(Vec3::new(0.0, 0.0, 5.0))
            .with_mass(20.0)
            .with_collider(ColliderConfiguration::default(), ShapeConfiguration::cuboid(Vec3::ONE))
            .with_collider(ColliderConfiguration::default(), ShapeConfiguration::sphere(0.5));

        assert_eq!(body.kind, BodyKind::Dynamic);
        assert_eq!(body.mass, 20.0);
        assert_eq!(body.colliders.len(), 2);
    }

    #[test]
    fn test_scene_serialization() {
        let mut scene = ColliderScene::new("Test Scene")
            .with_material("ice", PhysicsMaterial::ICE)
            .with_collision_group("NoTriggers", vec![0, 1]);
        scene.add_body(
            BodyTemplate::new("pillar").with_collider(
                ColliderConfiguration::default()
                    .with_materials(MaterialSelection::single(MaterialId::new("ice"))),
                ShapeConfiguration::capsule(4.0, 1.0),
            ),
        );

        let serialized = ron::ser::to_string_pretty(&scene, ron::ser::PrettyConfig::new()).unwrap();
        assert!(serialized.contains("Test Scene"));
        assert!(serialized.contains("pillar"));
        assert!(serialized.contains("Capsule"));

        let deserialized: ColliderScene = ron::from_str(&serialized).unwrap();
        assert_eq!(deserialized, scene);
    }

    #[test]
    fn test_parse_scene_file_format() {
        let scene_ron = r#"
(
    name: "Yard",
    bodies: [
        (
            name: "floor",
            position: (0.0, 0.0, -1.0),
            colliders: [
                (
                    shape: Box((dimensions: (20.0, 20.0, 2.0))),
                ),
            ],
        ),
        (
            name: "ball",
            kind: Dynamic,
            mass: 3.0,
            colliders: [
                (
                    collider: (is_trigger: false, collision_group_id: "NoTriggers"),
                    shape: Sphere((radius: 0.5, scale: (2.0, 2.0, 2.0))),
                ),
            ],
        ),
    ],
    materials: {
        "rubber": (static_friction: 1.0, dynamic_friction: 0.9, restitution: 0.8),
    },
    collision_groups: {
        "NoTriggers": [0, 1],
    },
)
"#;
        let scene: ColliderScene = ron::from_str(scene_ron).unwrap();
        assert_eq!(scene.name, "Yard");
        assert_eq!(scene.bodies.len(), 2);
        assert_eq!(scene.collider_count(), 2);

        let floor = &scene.bodies[0];
        assert_eq!(floor.kind, BodyKind::Static);
        assert_eq!(floor.rotation, Quat::IDENTITY);
        assert_eq!(floor.colliders[0].shape.shape_type(), ShapeType::Box);
        assert_eq!(floor.colliders[0].shape.scale(), Vec3::ONE);

        let ball = &scene.bodies[1];
        assert_eq!(ball.kind, BodyKind::Dynamic);
        assert_eq!(ball.mass, 3.0);
        assert_eq!(ball.colliders[0].shape.scale(), Vec3::splat(2.0));
        assert_eq!(
            ball.colliders[0].collider.collision_group_id,
            CollisionGroupId::new("NoTriggers")
        );

        assert_eq!(scene.materials["rubber"], PhysicsMaterial::RUBBER);
        assert_eq!(scene.collision_groups["NoTriggers"], vec![0, 1]);
    }

    #[test]
    fn test_load_missing_file() {
        let result = ColliderScene::load("/nonexistent/scene.ron");
        assert!(matches!(result, Err(SceneLoadError::Io(_))));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = std::env::temp_dir().join("colliderkit_scene_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("saved.ron");

        let mut scene = ColliderScene::new("Saved");
        scene.add_body(BodyTemplate::new("rock").with_collider(
            ColliderConfiguration::default(),
            ShapeConfiguration::sphere(2.0),
        ));
        scene.save(&path).unwrap();

        let loaded = ColliderScene::load(&path).unwrap();
        assert_eq!(loaded, scene);

        let _ = std::fs::remove_file(&path);
    }
}
