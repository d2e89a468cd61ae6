//! Scene validation
//!
//! Validates collider scenes for common errors before they are built. The
//! [`SceneValidator`] checks for issues like empty scenes, duplicate body
//! names, bad scales and references to unknown materials or groups.

use std::collections::HashSet;

use colliderkit_math::is_strictly_positive;
use thiserror::Error;

use crate::collision::{CollisionGroupId, MAX_COLLISION_LAYERS};
use crate::scene::{BodyKind, ColliderScene};

/// Validation error found in a scene
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Scene has no bodies and no terrain
    #[error("Scene has no bodies")]
    EmptyScene,
    /// Duplicate body name found
    #[error("Duplicate body name: '{0}'")]
    DuplicateName(String),
    /// Body has no colliders
    #[error("Body '{0}' has no colliders")]
    NoColliders(String),
    /// A shape scale component is zero or negative
    #[error("Body '{body}' collider {index} has a non-positive scale")]
    NonPositiveScale { body: String, index: usize },
    /// Dynamic or kinematic body with a mass that is not positive
    #[error("Body '{0}' has a non-positive mass")]
    NonPositiveMass(String),
    /// Collider references a material that the scene does not define
    #[error("Body '{body}' uses unknown material '{material}'")]
    UnknownMaterial { body: String, material: String },
    /// Collider references a collision group that the scene does not define
    #[error("Body '{body}' uses unknown collision group '{group}'")]
    UnknownCollisionGroup { body: String, group: String },
    /// Collision group lists a layer index out of range
    #[error("Collision group '{group}' lists invalid layer {layer}")]
    InvalidLayer { group: String, layer: u8 },
}

/// Scene validator that checks for common errors
///
/// # Example
/// ```ignore
/// let errors = SceneValidator::validate(&scene);
/// for error in &errors {
///     log::warn!("Validation error: {}", error);
/// }
/// ```
pub struct SceneValidator;

impl SceneValidator {
    /// Validate a scene, returning all errors found
    ///
    /// Returns an empty vector if no validation errors are detected.
    pub fn validate(scene: &ColliderScene) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if scene.bodies.is_empty() && scene.terrain.is_empty() {
            errors.push(ValidationError::EmptyScene);
        }

        for (group, layers) in &scene.collision_groups {
            for &layer in layers {
                if layer >= MAX_COLLISION_LAYERS {
                    errors.push(ValidationError::InvalidLayer {
                        group: group.clone(),
                        layer,
                    });
                }
            }
        }

        let mut seen_names = HashSet::new();
        for body in &scene.bodies {
            if !seen_names.insert(body.name.as_str()) {
                errors.push(ValidationError::DuplicateName(body.name.clone()));
            }

            if body.colliders.is_empty() {
                errors.push(ValidationError::NoColliders(body.name.clone()));
            }

            if body.kind != BodyKind::Static && !(body.mass > 0.0) {
                errors.push(ValidationError::NonPositiveMass(body.name.clone()));
            }

            for (index, template) in body.colliders.iter().enumerate() {
                if !is_strictly_positive(template.shape.scale()) {
                    errors.push(ValidationError::NonPositiveScale {
                        body: body.name.clone(),
                        index,
                    });
                }

                for material in template.collider.material_selection.material_ids() {
                    if !material.is_default() && !scene.materials.contains_key(material.name()) {
                        errors.push(ValidationError::UnknownMaterial {
                            body: body.name.clone(),
                            material: material.name().to_string(),
                        });
                    }
                }

                let group = &template.collider.collision_group_id;
                if !Self::is_known_group(scene, group) {
                    errors.push(ValidationError::UnknownCollisionGroup {
                        body: body.name.clone(),
                        group: group.name().to_string(),
                    });
                }
            }
        }

        for terrain in &scene.terrain {
            if !seen_names.insert(terrain.name.as_str()) {
                errors.push(ValidationError::DuplicateName(terrain.name.clone()));
            }
            if !Self::is_known_group(scene, &terrain.configuration.collision_group_id) {
                errors.push(ValidationError::UnknownCollisionGroup {
                    body: terrain.name.clone(),
                    group: terrain.configuration.collision_group_id.name().to_string(),
                });
            }
        }

        errors
    }

    /// Validate and return Result (Ok if no errors, Err with all errors)
    pub fn validate_or_error(scene: &ColliderScene) -> Result<(), Vec<ValidationError>> {
        let errors = Self::validate(scene);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn is_known_group(scene: &ColliderScene, group: &CollisionGroupId) -> bool {
        group.name() == CollisionGroupId::ALL_NAME || scene.collision_groups.contains_key(group.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset_cache::AssetRef;
    use crate::height_field::TerrainConfiguration;
    use crate::material::{MaterialId, MaterialSelection, PhysicsMaterial};
    use crate::scene::{BodyTemplate, TerrainTemplate};
    use crate::shape_config::{ColliderConfiguration, ShapeConfiguration};
    use colliderkit_math::Vec3;

    fn make_valid_scene() -> ColliderScene {
        let mut scene = ColliderScene::new("Valid Scene").with_material("rock", PhysicsMaterial::CONCRETE);
        scene.add_body(BodyTemplate::new("floor").with_collider(
            ColliderConfiguration::default().with_materials(MaterialSelection::single(MaterialId::new("rock"))),
            ShapeConfiguration::cuboid(Vec3::new(10.0, 10.0, 1.0)),
        ));
        scene
    }

    #[test]
    fn test_valid_scene_returns_no_errors() {
        let scene = make_valid_scene();
        let errors = SceneValidator::validate(&scene);
        assert!(errors.is_empty(), "Expected no errors, got: {:?}", errors);
        assert!(SceneValidator::validate_or_error(&scene).is_ok());
    }

    #[test]
    fn test_empty_scene_error() {
        let scene = ColliderScene::new("Empty");
        let result = SceneValidator::validate_or_error(&scene);
        assert_eq!(result.unwrap_err(), vec![ValidationError::EmptyScene]);
    }

    #[test]
    fn test_terrain_only_scene_is_not_empty() {
        let mut scene = ColliderScene::new("Terrain");
        scene.terrain.push(TerrainTemplate {
            name: "tile".to_string(),
            configuration: TerrainConfiguration::new(AssetRef::unbound("tile.hf")),
        });
        assert!(SceneValidator::validate(&scene).is_empty());
    }

    #[test]
    fn test_duplicate_names_detected() {
        let mut scene = make_valid_scene();
        scene.add_body(
            BodyTemplate::new("floor").with_collider(ColliderConfiguration::default(), ShapeConfiguration::sphere(1.0)),
        );

        let errors = SceneValidator::validate(&scene);
        assert!(
            errors.contains(&ValidationError::DuplicateName("floor".to_string())),
            "Expected DuplicateName error, got: {:?}",
            errors
        );
    }

    #[test]
    fn test_body_without_colliders() {
        let mut scene = make_valid_scene();
        scene.add_body(BodyTemplate::new("ghost"));
        let errors = SceneValidator::validate(&scene);
        assert!(errors.contains(&ValidationError::NoColliders("ghost".to_string())));
    }

    #[test]
    fn test_non_positive_scale_detected() {
        let mut scene = make_valid_scene();
        scene.add_body(BodyTemplate::new("flat").with_collider(
            ColliderConfiguration::default(),
            ShapeConfiguration::sphere(1.0).with_scale(Vec3::new(1.0, 0.0, 1.0)),
        ));

        let errors = SceneValidator::validate(&scene);
        assert!(errors.contains(&ValidationError::NonPositiveScale {
            body: "flat".to_string(),
            index: 0,
        }));
    }

    #[test]
    fn test_dynamic_body_needs_mass() {
        let mut scene = make_valid_scene();
        scene.add_body(
            BodyTemplate::new("weightless")
                .with_kind(BodyKind::Dynamic)
                .with_mass(0.0)
                .with_collider(ColliderConfiguration::default(), ShapeConfiguration::sphere(1.0)),
        );
        // Static bodies ignore mass
        scene.add_body(
            BodyTemplate::new("anchor")
                .with_mass(0.0)
                .with_collider(ColliderConfiguration::default(), ShapeConfiguration::sphere(1.0)),
        );

        let errors = SceneValidator::validate(&scene);
        assert_eq!(errors, vec![ValidationError::NonPositiveMass("weightless".to_string())]);
    }

    #[test]
    fn test_unknown_references_detected() {
        let mut scene = make_valid_scene();
        scene.add_body(BodyTemplate::new("odd").with_collider(
            ColliderConfiguration::default()
                .with_materials(MaterialSelection::single(MaterialId::new("lava")))
                .with_group(CollisionGroupId::new("Ghosts")),
            ShapeConfiguration::sphere(1.0),
        ));

        let errors = SceneValidator::validate(&scene);
        assert!(errors.contains(&ValidationError::UnknownMaterial {
            body: "odd".to_string(),
            material: "lava".to_string(),
        }));
        assert!(errors.contains(&ValidationError::UnknownCollisionGroup {
            body: "odd".to_string(),
            group: "Ghosts".to_string(),
        }));
    }

    #[test]
    fn test_invalid_layer_in_group() {
        let scene = make_valid_scene().with_collision_group("Broken", vec![0, 64]);
        let errors = SceneValidator::validate(&scene);
        assert_eq!(
            errors,
            vec![ValidationError::InvalidLayer {
                group: "Broken".to_string(),
                layer: 64,
            }]
        );
    }

    #[test]
    fn test_validation_error_display() {
        assert_eq!(format!("{}", ValidationError::EmptyScene), "Scene has no bodies");
        assert_eq!(
            format!("{}", ValidationError::DuplicateName("foo".to_string())),
            "Duplicate body name: 'foo'"
        );
        assert!(format!(
            "{}",
            ValidationError::NonPositiveScale {
                body: "bar".to_string(),
                index: 2
            }
        )
        .contains("collider 2"));
    }
}
