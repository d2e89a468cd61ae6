//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use colliderkit::config::AppConfig;
use serial_test::serial;

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("CKIT_SCENE__PATH", "scenes/from_env.ron");
    let config = AppConfig::load().unwrap();
    assert_eq!(config.scene.path, "scenes/from_env.ron");
    std::env::remove_var("CKIT_SCENE__PATH");
}

#[test]
#[serial]
fn test_env_override_nested_number() {
    std::env::set_var("CKIT_PHYSICS__MAX_CONVEX_VERTICES", "64");
    let config = AppConfig::load().unwrap();
    assert_eq!(config.physics.max_convex_vertices, 64);
    assert_eq!(config.physics.to_cooking_params().max_convex_vertices, 64);
    std::env::remove_var("CKIT_PHYSICS__MAX_CONVEX_VERTICES");
}

#[test]
#[serial]
fn test_default_file_loading() {
    std::env::remove_var("CKIT_SCENE__PATH");

    let cwd = std::env::current_dir().unwrap();
    assert!(cwd.join("config/default.toml").exists());

    let config = AppConfig::load().unwrap();
    assert_eq!(config.scene.path, "scenes/default.ron");
    assert_eq!(config.assets.root, std::path::PathBuf::from("assets"));
}

#[test]
#[serial]
fn test_missing_directory_uses_defaults() {
    let config = AppConfig::load_from("does/not/exist").unwrap();
    assert_eq!(config.debug.log_level, "info");
    assert!(!config.debug.draw_colliders);
}
