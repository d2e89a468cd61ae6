//! Scene construction utilities
//!
//! This module builds loaded collider scenes into a physics backend.

mod scene_builder;

pub use scene_builder::{BuiltBody, BuiltScene, SceneBuildError, SceneBuilder};
