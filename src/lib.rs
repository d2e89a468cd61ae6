//! colliderkit application library
//!
//! Configuration loading and scene building shared by the binary and the
//! integration tests.

pub mod config;
pub mod scene;
