//! Material and collision group registries
//!
//! The pipeline never owns materials or collision group tables. It looks
//! them up through [`MaterialRegistry`] and [`CollisionRegistry`], which the
//! application injects as trait objects. [`MaterialLibrary`] and
//! [`CollisionGroupTable`] are the stock implementations.

use std::collections::HashMap;

use colliderkit_core::{
    CollisionGroup, CollisionGroupId, CollisionLayer, MaterialHandle, MaterialId, MaterialSelection, PhysicsMaterial,
};

use crate::backend::PhysicsBackend;
use crate::error::PhysicsError;

/// Source of native materials
pub trait MaterialRegistry {
    /// Native materials for every slot of a selection, in slot order
    fn materials(&self, selection: &MaterialSelection) -> Vec<MaterialHandle>;
    /// The material used when nothing else applies
    fn default_material(&self) -> Option<MaterialHandle>;
}

/// Source of named collision groups
pub trait CollisionRegistry {
    fn collision_group(&self, id: &CollisionGroupId) -> Option<CollisionGroup>;
}

/// Named materials created in a backend
#[derive(Debug, Default)]
pub struct MaterialLibrary {
    default: Option<MaterialHandle>,
    by_name: HashMap<String, MaterialHandle>,
}

impl MaterialLibrary {
    /// Empty library with no default material
    pub fn new() -> Self {
        Self::default()
    }

    /// Library whose default material is created from `material`
    pub fn with_default(backend: &mut dyn PhysicsBackend, material: &PhysicsMaterial) -> Result<Self, PhysicsError> {
        let mut library = Self::new();
        library.set_default(backend, material)?;
        Ok(library)
    }

    /// Create and install the default material
    pub fn set_default(
        &mut self,
        backend: &mut dyn PhysicsBackend,
        material: &PhysicsMaterial,
    ) -> Result<MaterialHandle, PhysicsError> {
        let handle = backend
            .create_material(material)
            .ok_or_else(|| PhysicsError::ResourceCreationFailed("default material".to_string()))?;
        self.default = Some(handle);
        Ok(handle)
    }

    /// Create a named material, replacing any earlier one with the same name
    pub fn register(
        &mut self,
        backend: &mut dyn PhysicsBackend,
        name: impl Into<String>,
        material: &PhysicsMaterial,
    ) -> Result<MaterialHandle, PhysicsError> {
        let name = name.into();
        let handle = backend
            .create_material(material)
            .ok_or_else(|| PhysicsError::ResourceCreationFailed(format!("material '{}'", name)))?;
        self.by_name.insert(name, handle);
        Ok(handle)
    }

    /// Look up a material by id; the empty id is the default material
    pub fn get(&self, id: &MaterialId) -> Option<MaterialHandle> {
        if id.is_default() {
            return self.default;
        }
        self.by_name.get(id.name()).copied()
    }

    /// Number of named materials
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl MaterialRegistry for MaterialLibrary {
    fn materials(&self, selection: &MaterialSelection) -> Vec<MaterialHandle> {
        selection
            .material_ids()
            .iter()
            .filter_map(|id| match self.get(id) {
                Some(handle) => Some(handle),
                None => {
                    log::warn!("Unknown material '{}', using the default material", id.name());
                    self.default
                }
            })
            .collect()
    }

    fn default_material(&self) -> Option<MaterialHandle> {
        self.default
    }
}

/// Named collision groups
///
/// The "All" group is always present.
#[derive(Debug, Clone)]
pub struct CollisionGroupTable {
    groups: HashMap<String, CollisionGroup>,
}

impl Default for CollisionGroupTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionGroupTable {
    pub fn new() -> Self {
        let mut groups = HashMap::new();
        groups.insert(CollisionGroupId::ALL_NAME.to_string(), CollisionGroup::ALL);
        Self { groups }
    }

    /// Define a group
    pub fn insert(&mut self, name: impl Into<String>, group: CollisionGroup) {
        self.groups.insert(name.into(), group);
    }

    /// Define a group from the layers it accepts; invalid layer indices are skipped
    pub fn insert_layers(&mut self, name: impl Into<String>, layers: &[u8]) {
        let name = name.into();
        let valid: Vec<CollisionLayer> = layers
            .iter()
            .filter_map(|&index| {
                let layer = CollisionLayer::new(index);
                if layer.is_none() {
                    log::warn!("Collision group '{}' skips invalid layer {}", name, index);
                }
                layer
            })
            .collect();
        self.insert(name, CollisionGroup::from_layers(&valid));
    }
}

impl CollisionRegistry for CollisionGroupTable {
    fn collision_group(&self, id: &CollisionGroupId) -> Option<CollisionGroup> {
        self.groups.get(id.name()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::software::SoftwareBackend;

    #[test]
    fn test_library_lookup_and_fallback() {
        let mut backend = SoftwareBackend::new();
        let mut library = MaterialLibrary::with_default(&mut backend, &PhysicsMaterial::default()).unwrap();
        let ice = library.register(&mut backend, "ice", &PhysicsMaterial::ICE).unwrap();
        let default = library.default_material().unwrap();

        let selection = MaterialSelection::new(vec![
            MaterialId::new("ice"),
            MaterialId::default(),
            MaterialId::new("missing"),
        ]);
        assert_eq!(library.materials(&selection), vec![ice, default, default]);
        assert_eq!(backend.material(ice), Some(PhysicsMaterial::ICE));
    }

    #[test]
    fn test_library_without_default_skips_unknown() {
        let library = MaterialLibrary::new();
        let selection = MaterialSelection::single(MaterialId::new("missing"));
        assert!(library.materials(&selection).is_empty());
        assert!(library.default_material().is_none());
    }

    #[test]
    fn test_group_table_has_all() {
        let table = CollisionGroupTable::new();
        assert_eq!(table.collision_group(&CollisionGroupId::all()), Some(CollisionGroup::ALL));
        assert_eq!(table.collision_group(&CollisionGroupId::new("Nope")), None);
    }

    #[test]
    fn test_group_from_layers() {
        let mut table = CollisionGroupTable::new();
        table.insert_layers("Ground", &[0, 1, 200]);
        let group = table.collision_group(&CollisionGroupId::new("Ground")).unwrap();
        assert!(group.contains_layer(CollisionLayer::DEFAULT));
        assert!(group.contains_layer(CollisionLayer::STATIC));
        assert!(!group.contains_layer(CollisionLayer::TRIGGER));
    }
}
