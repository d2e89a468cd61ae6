//! Expansion of mesh assets into collider/shape pairs
//!
//! A physics asset shape stands for every sub-shape stored in its mesh asset.
//! Expansion copies the master collider configuration once per sub-shape and
//! specializes it with the sub-shape's material slot and authored overrides.

use colliderkit_core::{
    ColliderConfiguration, PhysicsAssetShapeConfiguration, ShapeConfiguration, ShapeConfigurationList,
    TRIANGLE_MESH_MATERIAL_INDEX,
};

use crate::backend::PhysicsBackend;
use crate::error::PhysicsError;
use crate::geometry::{cache_or_release_mesh, native_mesh_from_cooked_data};

/// Expand an asset shape into one collider/shape pair per sub-shape
///
/// Order follows the asset. For each sub-shape:
///
/// 1. the master collider is copied
/// 2. unless the sub-shape's materials are baked into a triangle mesh, the
///    copy's material slots are replaced by the single master slot at the
///    sub-shape's material index
/// 3. collider values authored on the asset are applied
/// 4. the shape scale becomes `scale * asset_scale`
///
/// # Errors
///
/// [`PhysicsError::AssetNotReady`] if the asset is not loaded or its data is
/// inconsistent.
pub fn try_collider_shapes_from_asset(
    asset_configuration: &PhysicsAssetShapeConfiguration,
    master_collider: &ColliderConfiguration,
) -> Result<ShapeConfigurationList, PhysicsError> {
    let asset = asset_configuration
        .asset
        .get()
        .ok_or_else(|| PhysicsError::AssetNotReady(asset_configuration.asset.hint()))?;
    let data = &asset.data;
    data.validate()
        .map_err(|reason| PhysicsError::AssetNotReady(format!("{}: {}", asset_configuration.asset.hint(), reason)))?;

    let scale = asset_configuration.scale * asset_configuration.asset_scale;
    let shapes = data
        .collider_shapes
        .iter()
        .zip(&data.material_index_per_shape)
        .map(|((overrides, shape), &material_index)| {
            let mut collider = master_collider.clone();

            if material_index != TRIANGLE_MESH_MATERIAL_INDEX {
                let assigned = master_collider.material_selection.material_id(usize::from(material_index));
                collider.material_selection.set_material_slots(Vec::new());
                collider.material_selection.set_material_id(assigned);
            }

            if let Some(overrides) = overrides {
                overrides.update_collider_configuration(&mut collider);
            }

            let mut shape = shape.clone();
            shape.set_scale(scale);
            (collider, shape)
        })
        .collect();

    Ok(shapes)
}

/// Like [`try_collider_shapes_from_asset`], logging failures and returning
/// an empty list instead
pub fn collider_shapes_from_asset(
    asset_configuration: &PhysicsAssetShapeConfiguration,
    master_collider: &ColliderConfiguration,
) -> ShapeConfigurationList {
    match try_collider_shapes_from_asset(asset_configuration, master_collider) {
        Ok(shapes) => shapes,
        Err(err) => {
            log::warn!("Cannot expand physics asset: {}", err);
            Vec::new()
        }
    }
}

/// Create the native meshes of an asset's cooked sub-shapes
///
/// The meshes are cached on the asset's own configurations, so every later
/// expansion of the asset reuses them. Sub-shapes that fail are logged and
/// left uncached. Does nothing if the asset is not ready.
pub fn prepare_asset_meshes(backend: &mut dyn PhysicsBackend, asset_configuration: &PhysicsAssetShapeConfiguration) {
    let Some(asset) = asset_configuration.asset.get() else {
        return;
    };

    for (index, (_, shape)) in asset.data.collider_shapes.iter().enumerate() {
        let ShapeConfiguration::CookedMesh(cooked) = shape else {
            continue;
        };
        if cooked.cached_mesh().is_some() {
            continue;
        }

        match native_mesh_from_cooked_data(backend, cooked.cooked_mesh_data(), cooked.mesh_kind()) {
            Ok(mesh) => {
                cache_or_release_mesh(backend, cooked, mesh);
            }
            Err(err) => {
                log::warn!(
                    "Sub-shape {} of {}: {}",
                    index,
                    asset_configuration.asset.hint(),
                    err
                );
            }
        }
    }
}
