//! Actor factories
//!
//! Creates static and dynamic actors from body configurations. Shapes are
//! attached separately; see [`ShapeFactory`](crate::ShapeFactory).

use colliderkit_core::{ActorHandle, EntityId};
use colliderkit_math::{Pose, Quat, Vec3};

use crate::backend::{DynamicProperties, PhysicsBackend};
use crate::error::PhysicsError;

/// Where a body lives in the world and who owns it
#[derive(Clone, Debug, PartialEq)]
pub struct WorldBodyConfiguration {
    pub position: Vec3,
    pub orientation: Quat,
    pub entity_id: EntityId,
    pub debug_name: String,
}

impl Default for WorldBodyConfiguration {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            entity_id: EntityId::INVALID,
            debug_name: String::new(),
        }
    }
}

impl WorldBodyConfiguration {
    /// Body at a position, owned by `entity_id`
    pub fn new(position: Vec3, entity_id: EntityId, debug_name: impl Into<String>) -> Self {
        Self {
            position,
            entity_id,
            debug_name: debug_name.into(),
            ..Self::default()
        }
    }

    /// Set the orientation of this body
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    /// World pose with the orientation normalized
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.orientation).normalized()
    }
}

/// A simulated body
#[derive(Clone, Debug, PartialEq)]
pub struct RigidBodyConfiguration {
    pub world: WorldBodyConfiguration,
    pub mass: f32,
    /// Mass-normalized kinetic energy below which the body may sleep
    pub sleep_threshold: f32,
    pub initial_linear_velocity: Vec3,
    pub initial_angular_velocity: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub center_of_mass_offset: Vec3,
    /// Moved by the application rather than the simulation
    pub kinematic: bool,
    pub max_angular_velocity: f32,
}

impl Default for RigidBodyConfiguration {
    fn default() -> Self {
        Self {
            world: WorldBodyConfiguration::default(),
            mass: 1.0,
            sleep_threshold: 0.005,
            initial_linear_velocity: Vec3::ZERO,
            initial_angular_velocity: Vec3::ZERO,
            linear_damping: 0.05,
            angular_damping: 0.15,
            center_of_mass_offset: Vec3::ZERO,
            kinematic: false,
            max_angular_velocity: 100.0,
        }
    }
}

impl RigidBodyConfiguration {
    pub fn new(world: WorldBodyConfiguration) -> Self {
        Self {
            world,
            ..Self::default()
        }
    }

    /// Set the mass of this body
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Set the initial linear velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.initial_linear_velocity = velocity;
        self
    }

    /// Set whether this body is kinematic
    pub fn with_kinematic(mut self, kinematic: bool) -> Self {
        self.kinematic = kinematic;
        self
    }

    pub fn dynamic_properties(&self) -> DynamicProperties {
        DynamicProperties {
            mass: self.mass,
            sleep_threshold: self.sleep_threshold,
            linear_velocity: self.initial_linear_velocity,
            angular_velocity: self.initial_angular_velocity,
            linear_damping: self.linear_damping,
            angular_damping: self.angular_damping,
            center_of_mass_offset: self.center_of_mass_offset,
            kinematic: self.kinematic,
            max_angular_velocity: self.max_angular_velocity,
        }
    }
}

/// Create a dynamic actor
pub fn create_rigid_body(
    backend: &mut dyn PhysicsBackend,
    configuration: &RigidBodyConfiguration,
) -> Result<ActorHandle, PhysicsError> {
    let world = &configuration.world;
    backend
        .create_dynamic_actor(
            world.pose(),
            world.entity_id,
            &world.debug_name,
            &configuration.dynamic_properties(),
        )
        .ok_or_else(|| {
            log::error!("Failed to create rigid actor. Name: {}", world.debug_name);
            PhysicsError::ResourceCreationFailed(format!("rigid body '{}'", world.debug_name))
        })
}

/// Create a static actor
pub fn create_static_body(
    backend: &mut dyn PhysicsBackend,
    configuration: &WorldBodyConfiguration,
) -> Result<ActorHandle, PhysicsError> {
    backend
        .create_static_actor(configuration.pose(), configuration.entity_id, &configuration.debug_name)
        .ok_or_else(|| PhysicsError::ResourceCreationFailed(format!("static body '{}'", configuration.debug_name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::software::SoftwareBackend;

    #[test]
    fn test_rigid_body_defaults() {
        let config = RigidBodyConfiguration::default();
        assert_eq!(config.mass, 1.0);
        assert!(!config.kinematic);
        assert_eq!(config.world.entity_id, EntityId::INVALID);
    }

    #[test]
    fn test_create_rigid_body_normalizes_orientation() {
        let mut backend = SoftwareBackend::new();
        let world = WorldBodyConfiguration::new(Vec3::new(1.0, 2.0, 3.0), EntityId(7), "crate")
            .with_orientation(Quat::from_xyzw(0.0, 0.0, 2.0, 0.0));
        let config = RigidBodyConfiguration::new(world)
            .with_mass(4.0)
            .with_velocity(Vec3::X);

        let actor = create_rigid_body(&mut backend, &config).unwrap();
        let record = backend.actor(actor).unwrap();
        assert!(record.pose.rotation.is_normalized());
        assert_eq!(record.pose.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(record.entity, EntityId(7));
        assert_eq!(record.name, "crate");

        let dynamics = record.dynamics.unwrap();
        assert_eq!(dynamics.mass, 4.0);
        assert_eq!(dynamics.linear_velocity, Vec3::X);
    }

    #[test]
    fn test_create_static_body() {
        let mut backend = SoftwareBackend::new();
        let actor = create_static_body(&mut backend, &WorldBodyConfiguration::default()).unwrap();
        assert!(backend.actor(actor).unwrap().dynamics.is_none());
    }

    #[test]
    fn test_backend_failure_maps_to_error() {
        let mut backend = SoftwareBackend::new();
        backend.set_refuse_creation(true);

        assert!(matches!(
            create_static_body(&mut backend, &WorldBodyConfiguration::default()),
            Err(PhysicsError::ResourceCreationFailed(_))
        ));
        assert!(matches!(
            create_rigid_body(&mut backend, &RigidBodyConfiguration::default()),
            Err(PhysicsError::ResourceCreationFailed(_))
        ));
    }
}
