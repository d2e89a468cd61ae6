//! Physics scene membership

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use colliderkit_core::ActorHandle;

use crate::backend::PhysicsBackend;

/// Set of actors taking part in a simulation
///
/// Every mutation holds the write lock for the duration of the call only.
#[derive(Debug, Default)]
pub struct PhysicsScene {
    actors: RwLock<HashSet<ActorHandle>>,
}

impl PhysicsScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashSet<ActorHandle>> {
        self.actors.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashSet<ActorHandle>> {
        self.actors.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an actor; returns false if it was already present
    pub fn add_actor(&self, actor: ActorHandle) -> bool {
        self.write().insert(actor)
    }

    /// Remove an actor without releasing it
    pub fn remove_actor(&self, actor: ActorHandle) -> bool {
        self.write().remove(&actor)
    }

    /// Remove an actor from the scene, then release it and its shapes
    pub fn release_actor(&self, backend: &mut dyn PhysicsBackend, actor: ActorHandle) {
        if self.write().remove(&actor) {
            log::debug!("Released actor {:?} from the scene", actor);
        }
        backend.release_actor(actor);
    }

    pub fn contains(&self, actor: ActorHandle) -> bool {
        self.read().contains(&actor)
    }

    /// Snapshot of the current actors
    pub fn actors(&self) -> Vec<ActorHandle> {
        self.read().iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::{create_static_body, WorldBodyConfiguration};
    use crate::software::SoftwareBackend;
    use std::sync::Arc;

    #[test]
    fn test_add_and_remove() {
        let mut backend = SoftwareBackend::new();
        let actor = create_static_body(&mut backend, &WorldBodyConfiguration::default()).unwrap();
        let scene = PhysicsScene::new();

        assert!(scene.add_actor(actor));
        assert!(!scene.add_actor(actor));
        assert!(scene.contains(actor));
        assert_eq!(scene.actors(), vec![actor]);

        assert!(scene.remove_actor(actor));
        assert!(scene.is_empty());
        // Removing does not release
        assert!(backend.actor(actor).is_some());
    }

    #[test]
    fn test_release_actor() {
        let mut backend = SoftwareBackend::new();
        let actor = create_static_body(&mut backend, &WorldBodyConfiguration::default()).unwrap();
        let scene = PhysicsScene::new();
        scene.add_actor(actor);

        scene.release_actor(&mut backend, actor);
        assert!(!scene.contains(actor));
        assert_eq!(backend.actor_count(), 0);
    }

    #[test]
    fn test_shared_between_threads() {
        let mut backend = SoftwareBackend::new();
        let actors: Vec<ActorHandle> = (0..8)
            .map(|_| create_static_body(&mut backend, &WorldBodyConfiguration::default()).unwrap())
            .collect();
        let scene = Arc::new(PhysicsScene::new());

        let handles: Vec<_> = actors
            .iter()
            .map(|&actor| {
                let scene = Arc::clone(&scene);
                std::thread::spawn(move || scene.add_actor(actor))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(scene.len(), 8);
    }
}
