//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`CKIT_SECTION__KEY`)

use colliderkit_core::PhysicsMaterial;
use colliderkit_physics::CookingParams;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Physics configuration
    #[serde(default)]
    pub physics: PhysicsSettings,
    /// Asset configuration
    #[serde(default)]
    pub assets: AssetSettings,
    /// Scene configuration
    #[serde(default)]
    pub scene: SceneSettings,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`CKIT_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Load user config (optional)
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // CKIT_SCENE__PATH=scenes/test.ron -> scene.path = "scenes/test.ron"
        figment = figment.merge(Env::prefixed("CKIT_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Physics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Friction of the default material while at rest
    pub default_static_friction: f32,
    /// Friction of the default material while sliding
    pub default_dynamic_friction: f32,
    /// Restitution of the default material
    pub default_restitution: f32,
    /// Most vertices a cooked convex hull may have
    pub max_convex_vertices: u32,
    /// Longest triangle edge accepted when cooking triangle meshes
    pub max_triangle_edge: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        let material = PhysicsMaterial::default();
        let params = CookingParams::default();
        Self {
            default_static_friction: material.static_friction,
            default_dynamic_friction: material.dynamic_friction,
            default_restitution: material.restitution,
            max_convex_vertices: params.max_convex_vertices,
            max_triangle_edge: params.max_triangle_edge,
        }
    }
}

impl PhysicsSettings {
    /// Cooking limits for the backend
    pub fn to_cooking_params(&self) -> CookingParams {
        CookingParams {
            max_convex_vertices: self.max_convex_vertices,
            max_triangle_edge: self.max_triangle_edge,
        }
    }

    /// The material used when a collider selects none
    pub fn default_material(&self) -> PhysicsMaterial {
        PhysicsMaterial::new(
            self.default_static_friction,
            self.default_dynamic_friction,
            self.default_restitution,
        )
    }
}

/// Asset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Directory that asset paths in scenes are relative to
    pub root: PathBuf,
    /// Reload assets whose files change on disk
    pub hot_reload: bool,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            hot_reload: false,
        }
    }
}

impl AssetSettings {
    /// Resolve a scene-relative asset path against the asset root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Scene configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Collider scene to load at startup
    pub path: String,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            path: "scenes/default.ron".to_string(),
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Log debug sample points for every collider
    pub draw_colliders: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            draw_colliders: false,
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
#[error("Configuration error: {message}")]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}
