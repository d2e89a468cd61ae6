//! Builds the bundled demo scene end to end

use colliderkit::config::AppConfig;
use colliderkit::scene::SceneBuilder;
use colliderkit_core::{AssetCache, ColliderScene, SceneValidator, Vec3};
use colliderkit_physics::{PhysicsBackend, ShapeFlags, SoftwareBackend};

fn load_demo() -> ColliderScene {
    ColliderScene::load("scenes/default.ron").unwrap()
}

#[test]
fn test_demo_scene_is_valid() {
    let scene = load_demo();
    assert_eq!(scene.name, "Yard");
    assert!(SceneValidator::validate(&scene).is_empty());
}

#[test]
fn test_demo_scene_builds() {
    let config = AppConfig::default();
    let scene = load_demo();

    let mut backend = SoftwareBackend::with_params(config.physics.to_cooking_params());
    let mut assets = AssetCache::new();
    let built = SceneBuilder::new(&mut backend, &mut assets)
        .with_default_material(config.physics.default_material())
        .with_asset_root(&config.assets.root)
        .build(&scene)
        .unwrap();

    let names: Vec<&str> = built.bodies.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["floor", "ball", "pillar", "hills"]);
    assert_eq!(built.scene.len(), 4);

    let pillar = &built.bodies[2];
    assert_eq!(pillar.shapes.len(), 2);
    let top = backend.shape_flags(pillar.shapes[1].shape).unwrap();
    assert!(top.contains(ShapeFlags::TRIGGER_SHAPE));

    // Capsule along Z from z -0.5 to 2.5, trigger sphere of radius 1 at (4, 0, 3)
    assert!(pillar.bounds.min.abs_diff_eq(Vec3::new(3.0, -1.0, -0.5), 1e-4));
    assert!(pillar.bounds.max.abs_diff_eq(Vec3::new(5.0, 1.0, 4.0), 1e-4));

    assert_eq!(built.height_fields.len(), 1);
    assert_eq!(built.release(&mut backend, &mut assets), 1);
    assert_eq!(backend.actor_count(), 0);
    assert_eq!(backend.shape_count(), 0);
    assert_eq!(backend.height_field_count(), 0);
    assert_eq!(assets.asset_count(), 0);
}
