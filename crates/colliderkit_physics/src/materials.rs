//! Material resolution for shapes and terrain

use std::collections::BTreeMap;

use colliderkit_core::{MaterialHandle, MaterialSelection};

use crate::error::PhysicsError;
use crate::registry::MaterialRegistry;

/// Turns material selections into the native material list a shape needs
pub struct MaterialResolver<'a> {
    registry: &'a dyn MaterialRegistry,
}

impl<'a> MaterialResolver<'a> {
    pub fn new(registry: &'a dyn MaterialRegistry) -> Self {
        Self { registry }
    }

    fn default_material(&self) -> Result<MaterialHandle, PhysicsError> {
        self.registry.default_material().ok_or(PhysicsError::MaterialUnavailable)
    }

    /// Materials for a collider's selection
    ///
    /// A selection that resolves to nothing yields the default material alone.
    pub fn resolve(&self, selection: &MaterialSelection) -> Result<Vec<MaterialHandle>, PhysicsError> {
        let materials = self.registry.materials(selection);
        if !materials.is_empty() {
            return Ok(materials);
        }
        Ok(vec![self.default_material()?])
    }

    /// Materials for a height field, one per surface id in order
    ///
    /// Unmapped surfaces use the default material. A mapped surface whose
    /// selection resolves to nothing also uses the default, with a warning.
    pub fn resolve_terrain(
        &self,
        surface_ids: &[i32],
        surface_map: &BTreeMap<i32, MaterialSelection>,
    ) -> Result<Vec<MaterialHandle>, PhysicsError> {
        let default = self.default_material()?;
        if surface_ids.is_empty() {
            return Ok(vec![default]);
        }

        let materials = surface_ids
            .iter()
            .map(|surface_id| match surface_map.get(surface_id) {
                Some(selection) => match self.registry.materials(selection).first() {
                    Some(&material) => material,
                    None => {
                        log::warn!("Surface {} has an empty material list, using the default material", surface_id);
                        default
                    }
                },
                None => default,
            })
            .collect();
        Ok(materials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MaterialLibrary;
    use crate::software::SoftwareBackend;
    use colliderkit_core::{MaterialId, PhysicsMaterial};

    fn library(backend: &mut SoftwareBackend) -> MaterialLibrary {
        let mut library = MaterialLibrary::with_default(backend, &PhysicsMaterial::default()).unwrap();
        library.register(backend, "grass", &PhysicsMaterial::new(0.6, 0.5, 0.0)).unwrap();
        library.register(backend, "ice", &PhysicsMaterial::ICE).unwrap();
        library
    }

    #[test]
    fn test_empty_selection_gives_default() {
        let mut backend = SoftwareBackend::new();
        let library = library(&mut backend);
        let resolver = MaterialResolver::new(&library);

        let materials = resolver.resolve(&MaterialSelection::default()).unwrap();
        assert_eq!(materials, vec![library.default_material().unwrap()]);
    }

    #[test]
    fn test_selection_keeps_slot_order() {
        let mut backend = SoftwareBackend::new();
        let library = library(&mut backend);
        let resolver = MaterialResolver::new(&library);

        let selection = MaterialSelection::new(vec![MaterialId::new("ice"), MaterialId::new("grass")]);
        let materials = resolver.resolve(&selection).unwrap();
        assert_eq!(
            materials,
            vec![
                library.get(&MaterialId::new("ice")).unwrap(),
                library.get(&MaterialId::new("grass")).unwrap()
            ]
        );
    }

    #[test]
    fn test_no_default_is_an_error() {
        let library = MaterialLibrary::new();
        let resolver = MaterialResolver::new(&library);
        assert_eq!(
            resolver.resolve(&MaterialSelection::default()),
            Err(PhysicsError::MaterialUnavailable)
        );
        assert_eq!(
            resolver.resolve_terrain(&[], &BTreeMap::new()),
            Err(PhysicsError::MaterialUnavailable)
        );
    }

    #[test]
    fn test_terrain_without_surfaces_gives_default() {
        let mut backend = SoftwareBackend::new();
        let library = library(&mut backend);
        let resolver = MaterialResolver::new(&library);

        let materials = resolver.resolve_terrain(&[], &BTreeMap::new()).unwrap();
        assert_eq!(materials, vec![library.default_material().unwrap()]);
    }

    #[test]
    fn test_terrain_surface_mapping() {
        let mut backend = SoftwareBackend::new();
        let mut library = library(&mut backend);
        let default = library.default_material().unwrap();
        let grass = library.get(&MaterialId::new("grass")).unwrap();

        let mut surface_map = BTreeMap::new();
        surface_map.insert(1, MaterialSelection::single(MaterialId::new("grass")));
        surface_map.insert(2, MaterialSelection::default());

        // Mapped to an empty selection, then unmapped
        let resolver = MaterialResolver::new(&library);
        let materials = resolver.resolve_terrain(&[1, 2, 3], &surface_map).unwrap();
        assert_eq!(materials, vec![grass, default, default]);

        // A later registration does not change earlier handles
        library.register(&mut backend, "mud", &PhysicsMaterial::CONCRETE).unwrap();
        assert_eq!(library.get(&MaterialId::new("grass")), Some(grass));
    }
}
