//! colliderkit - collider scene builder
//!
//! Loads a collider scene, builds it into the software backend and reports
//! the world bounds of every body.

use std::process::ExitCode;

use colliderkit::config::AppConfig;
use colliderkit::scene::{SceneBuildError, SceneBuilder};
use colliderkit_core::{
    AssetCache, ColliderScene, MeshAsset, Pose, SceneLoadError, SceneValidator, ShapeConfiguration, Vec3,
};
use colliderkit_physics::{
    collider_points_local_to_world, generate_box_points, generate_cylinder_points, generate_sphere_points,
    SoftwareBackend,
};

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("Failed to load scene '{path}': {source}")]
    Load {
        path: String,
        #[source]
        source: SceneLoadError,
    },
    #[error("Scene '{0}' failed validation with {1} error(s)")]
    Invalid(String, usize),
    #[error(transparent)]
    Build(#[from] SceneBuildError),
}

fn init_logging(level: &str) {
    // RUST_LOG takes precedence over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Debug sample points for a primitive shape, in collider space
fn debug_points(shape: &ShapeConfiguration) -> Vec<Vec3> {
    match shape {
        ShapeConfiguration::Sphere(sphere) => generate_sphere_points(sphere.radius * sphere.scale.max_element()),
        ShapeConfiguration::Box(cuboid) => {
            let half = cuboid.dimensions * 0.5 * cuboid.scale;
            generate_box_points(-half, half)
        }
        ShapeConfiguration::Capsule(capsule) => {
            let radius = capsule.radius * capsule.scale.x.max(capsule.scale.y);
            generate_cylinder_points(capsule.height * capsule.scale.z, radius)
        }
        _ => Vec::new(),
    }
}

fn log_collider_points(scene: &ColliderScene) {
    for body in &scene.bodies {
        let pose = Pose::new(body.position, body.rotation).normalized();
        for (index, template) in body.colliders.iter().enumerate() {
            let mut points = debug_points(&template.shape);
            if points.is_empty() {
                continue;
            }
            collider_points_local_to_world(&mut points, &pose, &template.collider);
            log::debug!(
                "{} collider {}: {} debug points, first {:?}",
                body.name,
                index,
                points.len(),
                points.first()
            );
        }
    }
}

fn run(config: &AppConfig) -> Result<(), AppError> {
    let scene = ColliderScene::load(&config.scene.path).map_err(|source| AppError::Load {
        path: config.scene.path.clone(),
        source,
    })?;
    log::info!(
        "Loaded scene '{}' with {} bodies and {} terrain tiles",
        scene.name,
        scene.bodies.len(),
        scene.terrain.len()
    );

    let errors = SceneValidator::validate(&scene);
    if !errors.is_empty() {
        for error in &errors {
            log::error!("{}", error);
        }
        return Err(AppError::Invalid(scene.name.clone(), errors.len()));
    }

    let mut backend = SoftwareBackend::with_params(config.physics.to_cooking_params());
    let mut assets = AssetCache::new();
    assets.set_watch_for_changes(config.assets.hot_reload);

    let built = SceneBuilder::new(&mut backend, &mut assets)
        .with_default_material(config.physics.default_material())
        .with_asset_root(&config.assets.root)
        .build(&scene)?;

    for body in &built.bodies {
        log::info!(
            "{} {}: {} shape(s), bounds {} .. {}",
            body.entity,
            body.name,
            body.shapes.len(),
            body.bounds.min,
            body.bounds.max
        );
    }

    if config.debug.draw_colliders {
        log_collider_points(&scene);
    }

    if assets.is_watching_for_changes() {
        let reloaded = assets.check_hot_reload::<MeshAsset>();
        log::debug!("{} mesh asset(s) changed since loading", reloaded.len());
    }

    built.release(&mut backend, &mut assets);
    log::info!(
        "Released scene; {} shapes and {} actors remain",
        backend.shape_count(),
        backend.actor_count()
    );
    Ok(())
}

fn main() -> ExitCode {
    let config = AppConfig::load();
    let level = config
        .as_ref()
        .map(|c| c.debug.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(&level);
    log::info!("Starting colliderkit");

    let config = config.unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
