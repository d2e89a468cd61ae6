//! Mesh asset data
//!
//! A mesh asset is the baked output of the mesh import pipeline: an ordered
//! list of sub-shapes, each with an optional collider override, plus the
//! material slot each sub-shape uses. Files are stored as RON.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use colliderkit_math::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::asset_cache::Asset;
use crate::asset_error::AssetError;
use crate::shape_config::{ColliderConfiguration, MeshKind, ShapeConfiguration, ShapeType};

/// Material index meaning "materials are baked into the triangle mesh"
pub const TRIANGLE_MESH_MATERIAL_INDEX: u16 = u16::MAX;

/// Collider values authored on an asset sub-shape
///
/// Only the fields that are set override the collider configuration the
/// asset is attached with.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetColliderConfiguration {
    pub position: Option<Vec3>,
    pub rotation: Option<Quat>,
    pub tag: Option<String>,
    pub is_trigger: Option<bool>,
}

impl AssetColliderConfiguration {
    /// Override with a local transform
    pub fn with_transform(position: Vec3, rotation: Quat) -> Self {
        Self {
            position: Some(position),
            rotation: Some(rotation),
            ..Default::default()
        }
    }

    /// Write the authored values into a collider configuration
    pub fn update_collider_configuration(&self, collider: &mut ColliderConfiguration) {
        if let Some(position) = self.position {
            collider.position = position;
        }
        if let Some(rotation) = self.rotation {
            collider.rotation = rotation;
        }
        if let Some(tag) = &self.tag {
            collider.tag = tag.clone();
        }
        if let Some(is_trigger) = self.is_trigger {
            collider.is_trigger = is_trigger;
        }
    }
}

/// One sub-shape of a mesh asset
pub type AssetShapePair = (Option<AssetColliderConfiguration>, ShapeConfiguration);

/// Serialized content of a mesh asset
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshAssetData {
    pub collider_shapes: Vec<AssetShapePair>,
    /// Authored material slot names
    pub material_names: Vec<String>,
    /// Material slot per sub-shape, parallel to `collider_shapes`
    pub material_index_per_shape: Vec<u16>,
}

impl MeshAssetData {
    /// Asset holding a single cooked mesh with its materials baked in
    pub fn from_cooked_mesh(cooked_data: Vec<u8>, mesh_kind: MeshKind) -> Self {
        let mut data = Self::default();
        data.add_shape(
            None,
            ShapeConfiguration::cooked_mesh(cooked_data, mesh_kind),
            TRIANGLE_MESH_MATERIAL_INDEX,
        );
        data
    }

    /// Append a sub-shape
    pub fn add_shape(
        &mut self,
        collider: Option<AssetColliderConfiguration>,
        shape: ShapeConfiguration,
        material_index: u16,
    ) {
        self.collider_shapes.push((collider, shape));
        self.material_index_per_shape.push(material_index);
    }

    /// Number of sub-shapes
    pub fn shape_count(&self) -> usize {
        self.collider_shapes.len()
    }

    /// Check that the per-shape arrays line up and no sub-shape is itself an asset
    pub fn validate(&self) -> Result<(), String> {
        if self.material_index_per_shape.len() != self.collider_shapes.len() {
            return Err(format!(
                "{} material indices for {} shapes",
                self.material_index_per_shape.len(),
                self.collider_shapes.len()
            ));
        }
        if let Some(index) = self
            .collider_shapes
            .iter()
            .position(|(_, shape)| shape.shape_type() == ShapeType::PhysicsAsset)
        {
            return Err(format!("sub-shape {} is a nested physics asset", index));
        }
        Ok(())
    }

    /// Decode from RON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let data: Self = ron::de::from_bytes(bytes)?;
        Ok(data)
    }

    /// Load from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let bytes = read_file(path)?;
        Self::from_bytes(&bytes)
    }

    /// Save to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), AssetError> {
        let pretty = ron::ser::PrettyConfig::new().enumerate_arrays(false);
        let contents = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Loaded mesh asset
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshAsset {
    pub data: MeshAssetData,
}

impl MeshAsset {
    pub fn new(data: MeshAssetData) -> Self {
        Self { data }
    }
}

impl Asset for MeshAsset {
    fn load_from_file(path: &Path) -> Result<Self, AssetError> {
        Ok(Self::new(MeshAssetData::load(path)?))
    }
}

/// Read a whole file into memory
///
/// An empty file is an error, as is a file that yields fewer bytes than its
/// reported size.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, AssetError> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let size = file.metadata()?.len() as usize;
    if size == 0 {
        return Err(AssetError::Empty(path.display().to_string()));
    }

    let mut buffer = vec![0u8; size];
    file.read_exact(&mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("colliderkit_mesh_asset_tests");
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_update_collider_only_touches_set_fields() {
        let mut collider = ColliderConfiguration::default().with_trigger(true);
        collider.tag = "master".to_string();

        let overrides = AssetColliderConfiguration {
            position: Some(Vec3::new(1.0, 2.0, 3.0)),
            ..Default::default()
        };
        overrides.update_collider_configuration(&mut collider);

        assert_eq!(collider.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(collider.rotation, Quat::IDENTITY);
        assert_eq!(collider.tag, "master");
        assert!(collider.is_trigger);
    }

    #[test]
    fn test_from_cooked_mesh_uses_baked_materials() {
        let data = MeshAssetData::from_cooked_mesh(vec![1, 2, 3], MeshKind::Triangle);
        assert_eq!(data.shape_count(), 1);
        assert_eq!(data.material_index_per_shape, vec![TRIANGLE_MESH_MATERIAL_INDEX]);
        assert!(data.collider_shapes[0].0.is_none());
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_validate_detects_mismatched_arrays() {
        let mut data = MeshAssetData::default();
        data.collider_shapes.push((None, ShapeConfiguration::sphere(1.0)));
        assert!(data.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nested_asset() {
        let data = MeshAssetData::from_bytes(
            br#"(collider_shapes: [(None, PhysicsAsset((asset: "other.pxmesh")))], material_index_per_shape: [0])"#,
        )
        .unwrap();
        assert_eq!(data.shape_count(), 1);
        assert_eq!(
            data.validate(),
            Err("sub-shape 0 is a nested physics asset".to_string())
        );
    }

    #[test]
    fn test_save_and_load_file() {
        let path = temp_path("round_trip.pxmesh");
        let mut data = MeshAssetData::from_cooked_mesh(vec![9, 8, 7, 6], MeshKind::Convex);
        data.add_shape(
            Some(AssetColliderConfiguration::with_transform(Vec3::X, Quat::IDENTITY)),
            ShapeConfiguration::cuboid(Vec3::splat(2.0)),
            0,
        );
        data.material_names.push("rock".to_string());

        data.save(&path).unwrap();
        let loaded = MeshAssetData::load(&path).unwrap();
        assert_eq!(loaded, data);

        let asset = MeshAsset::load_from_file(&path).unwrap();
        assert_eq!(asset.data.shape_count(), 2);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_read_file_rejects_empty_file() {
        let path = temp_path("empty.pxmesh");
        std::fs::write(&path, b"").unwrap();

        assert!(matches!(read_file(&path), Err(AssetError::Empty(_))));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_read_file_missing_is_io_error() {
        assert!(matches!(
            read_file("/nonexistent/mesh.pxmesh"),
            Err(AssetError::Io(_))
        ));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let path = temp_path("garbage.pxmesh");
        std::fs::write(&path, b"not ron at all {").unwrap();

        assert!(matches!(MeshAssetData::load(&path), Err(AssetError::Parse(_))));

        let _ = std::fs::remove_file(&path);
    }
}
