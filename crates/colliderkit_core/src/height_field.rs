//! Height-field assets and terrain configuration

use std::collections::BTreeMap;
use std::path::Path;

use colliderkit_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::asset_cache::{Asset, AssetRef};
use crate::asset_error::AssetError;
use crate::collision::{CollisionGroupId, CollisionLayer};
use crate::handles::HeightFieldHandle;
use crate::material::MaterialSelection;
use crate::mesh_asset::read_file;

/// One grid sample of a height field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightFieldSample {
    pub height: i16,
    /// Index into the terrain's surface id list
    pub material_index: u8,
}

/// Grid of height samples, row-major
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeightFieldData {
    pub rows: u32,
    pub columns: u32,
    pub samples: Vec<HeightFieldSample>,
}

impl HeightFieldData {
    /// Flat grid with every height set to zero
    pub fn flat(rows: u32, columns: u32) -> Self {
        Self {
            rows,
            columns,
            samples: vec![HeightFieldSample::default(); rows as usize * columns as usize],
        }
    }

    /// Whether the grid is at least 2x2 and fully populated
    pub fn is_valid(&self) -> bool {
        self.rows >= 2 && self.columns >= 2 && self.samples.len() as u64 == u64::from(self.rows) * u64::from(self.columns)
    }

    /// Lowest and highest sample heights
    pub fn height_range(&self) -> Option<(i16, i16)> {
        let min = self.samples.iter().map(|s| s.height).min()?;
        let max = self.samples.iter().map(|s| s.height).max()?;
        Some((min, max))
    }
}

/// Loaded height-field asset
///
/// `native` is filled once the backend has created the height field object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeightFieldAsset {
    pub data: HeightFieldData,
    native: Option<HeightFieldHandle>,
}

impl HeightFieldAsset {
    pub fn new(data: HeightFieldData) -> Self {
        Self { data, native: None }
    }

    /// Copy of this asset bound to a native height field
    pub fn with_native(mut self, handle: HeightFieldHandle) -> Self {
        self.native = Some(handle);
        self
    }

    /// The native height field, if created
    pub fn height_field(&self) -> Option<HeightFieldHandle> {
        self.native
    }
}

impl Asset for HeightFieldAsset {
    fn load_from_file(path: &Path) -> Result<Self, AssetError> {
        let bytes = read_file(path)?;
        let data: HeightFieldData = ron::de::from_bytes(&bytes)?;
        Ok(Self::new(data))
    }
}

fn default_terrain_scale() -> Vec3 {
    Vec3::ONE
}

/// Terrain tile built from a height-field asset
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfiguration {
    pub height_field_asset: AssetRef<HeightFieldAsset>,
    /// x spaces rows, y spaces columns, z scales heights
    #[serde(default = "default_terrain_scale")]
    pub scale: Vec3,
    /// Surface id for each material index used by the height field samples
    #[serde(default)]
    pub surface_id_index_mapping: Vec<i32>,
    /// Materials chosen by the user for each surface id
    #[serde(default)]
    pub materials_to_surface_ids: BTreeMap<i32, MaterialSelection>,
    #[serde(default = "terrain_layer")]
    pub collision_layer: CollisionLayer,
    #[serde(default)]
    pub collision_group_id: CollisionGroupId,
}

fn terrain_layer() -> CollisionLayer {
    CollisionLayer::STATIC
}

impl TerrainConfiguration {
    pub fn new(height_field_asset: AssetRef<HeightFieldAsset>) -> Self {
        Self {
            height_field_asset,
            scale: Vec3::ONE,
            surface_id_index_mapping: Vec::new(),
            materials_to_surface_ids: BTreeMap::new(),
            collision_layer: terrain_layer(),
            collision_group_id: CollisionGroupId::all(),
        }
    }

    /// Assign the material used for a surface id
    pub fn with_surface_material(mut self, surface_id: i32, selection: MaterialSelection) -> Self {
        if !self.surface_id_index_mapping.contains(&surface_id) {
            self.surface_id_index_mapping.push(surface_id);
        }
        self.materials_to_surface_ids.insert(surface_id, selection);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialId;

    #[test]
    fn test_flat_grid_is_valid() {
        let data = HeightFieldData::flat(4, 3);
        assert!(data.is_valid());
        assert_eq!(data.samples.len(), 12);
        assert_eq!(data.height_range(), Some((0, 0)));
    }

    #[test]
    fn test_degenerate_grid_is_invalid() {
        assert!(!HeightFieldData::flat(1, 8).is_valid());

        let mut data = HeightFieldData::flat(2, 2);
        data.samples.pop();
        assert!(!data.is_valid());
    }

    #[test]
    fn test_oversized_declared_grid_is_invalid() {
        let data: HeightFieldData =
            ron::from_str("(rows: 4294967295, columns: 4294967295, samples: [(height: 1, material_index: 0)])").unwrap();
        assert!(!data.is_valid());
    }

    #[test]
    fn test_asset_starts_without_native_handle() {
        let asset = HeightFieldAsset::new(HeightFieldData::flat(2, 2));
        assert!(asset.height_field().is_none());
    }

    #[test]
    fn test_surface_material_registers_surface_once() {
        let config = TerrainConfiguration::new(AssetRef::unbound("terrain.hf"))
            .with_surface_material(3, MaterialSelection::single(MaterialId::new("grass")))
            .with_surface_material(3, MaterialSelection::single(MaterialId::new("mud")));

        assert_eq!(config.surface_id_index_mapping, vec![3]);
        assert_eq!(
            config.materials_to_surface_ids[&3].material_id(0),
            MaterialId::new("mud")
        );
        assert_eq!(config.collision_layer, CollisionLayer::STATIC);
    }
}
