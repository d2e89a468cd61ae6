//! Asset caching, readiness and hot-reload
//!
//! This module provides a type-erased asset cache that can store any type
//! implementing the [`Asset`] trait. Assets are loaded from files, cached
//! with reference counting, and can be hot-reloaded when files change on disk.
//!
//! # Architecture
//!
//! - [`AssetId`] - Unique identifier for a cached asset (incrementing `u64`)
//! - [`AssetHandle`] - Untyped handle containing id and path
//! - [`AssetRef`] - Typed reference stored in configurations; shares the
//!   cache's slot so readiness and reloads are visible through every clone
//! - [`Asset`] trait - Implemented by types that can be loaded from files
//! - [`AssetCache`] - Main cache storing `Arc<dyn Any + Send + Sync>` slots
//!
//! Loading is either immediate ([`AssetCache::load`]) or deferred
//! ([`AssetCache::request`] + [`AssetCache::load_pending`]). Code that
//! consumes assets must check [`AssetRef::is_ready`] and retry once the
//! asset shows up in the list returned by `load_pending` or
//! `check_hot_reload`; nothing here blocks waiting for a load.
//!
//! # Example
//!
//! ```ignore
//! let mut cache = AssetCache::new();
//! let mesh = cache.request::<MeshAsset>("assets/rock.pxmesh");
//! assert!(!mesh.is_ready());
//! cache.load_pending::<MeshAsset>();
//! let data: Arc<MeshAsset> = mesh.get().unwrap();
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::asset_error::AssetError;

/// Unique identifier for an asset in the cache.
///
/// Asset IDs are assigned sequentially starting from 1. An ID of 0 is reserved
/// for references that are not bound to a cache entry.
pub type AssetId = u64;

/// A lightweight untyped handle to a cached asset.
#[derive(Clone, Debug, Default, Hash, Eq, PartialEq)]
pub struct AssetHandle {
    /// The unique ID of this asset in the cache
    id: AssetId,
    /// The file path this asset was loaded from
    path: PathBuf,
}

impl AssetHandle {
    /// Get the asset ID
    pub fn id(&self) -> AssetId {
        self.id
    }

    /// Get the file path this asset was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Trait for types that can be loaded from files and cached.
///
/// The type must be `Send + Sync + 'static` to allow shared access across threads.
pub trait Asset: Sized + Send + Sync + 'static {
    /// Load this asset from the given file path.
    ///
    /// # Errors
    ///
    /// Returns an [`AssetError`] if the file cannot be read or parsed.
    fn load_from_file(path: &Path) -> Result<Self, AssetError>;
}

/// Load state of an asset slot
#[derive(Debug, Default)]
pub enum AssetStatus<T> {
    /// Not known to any cache yet
    #[default]
    NotLoaded,
    /// Requested, waiting for [`AssetCache::load_pending`]
    Queued,
    /// Loaded and usable
    Ready(Arc<T>),
    /// Last load attempt failed
    Failed(String),
}

type Slot<T> = RwLock<AssetStatus<T>>;

fn store<T>(slot: &Slot<T>, status: AssetStatus<T>) {
    match slot.write() {
        Ok(mut guard) => *guard = status,
        Err(poisoned) => *poisoned.into_inner() = status,
    }
}

/// Typed reference to an asset
///
/// Cloning is cheap and every clone observes the same load state.
/// References deserialized from scenes or mesh assets start unbound and must
/// be passed through [`AssetCache::resolve`] before use.
pub struct AssetRef<T> {
    handle: AssetHandle,
    slot: Arc<Slot<T>>,
}

impl<T> AssetRef<T> {
    /// Reference to a path that is not loaded by any cache
    pub fn unbound(path: impl Into<PathBuf>) -> Self {
        Self {
            handle: AssetHandle {
                id: 0,
                path: path.into(),
            },
            slot: Arc::new(RwLock::new(AssetStatus::NotLoaded)),
        }
    }

    /// Ready reference that lives outside any cache (generated data, tests)
    pub fn detached(path: impl Into<PathBuf>, data: T) -> Self {
        Self {
            handle: AssetHandle {
                id: 0,
                path: path.into(),
            },
            slot: Arc::new(RwLock::new(AssetStatus::Ready(Arc::new(data)))),
        }
    }

    /// Cache id, 0 if unbound or detached
    pub fn id(&self) -> AssetId {
        self.handle.id
    }

    /// Untyped handle
    pub fn handle(&self) -> &AssetHandle {
        &self.handle
    }

    /// Source path
    pub fn path(&self) -> &Path {
        &self.handle.path
    }

    /// Human readable name for diagnostics
    pub fn hint(&self) -> String {
        self.handle.path.display().to_string()
    }

    /// Whether the data is loaded and usable
    pub fn is_ready(&self) -> bool {
        matches!(self.slot.read().as_deref(), Ok(AssetStatus::Ready(_)))
    }

    /// The loaded data, if ready
    pub fn get(&self) -> Option<Arc<T>> {
        match self.slot.read().as_deref() {
            Ok(AssetStatus::Ready(data)) => Some(Arc::clone(data)),
            _ => None,
        }
    }
}

impl<T> Clone for AssetRef<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for AssetRef<T> {
    fn default() -> Self {
        Self::unbound(PathBuf::new())
    }
}

impl<T> PartialEq for AssetRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl<T> fmt::Debug for AssetRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetRef")
            .field("id", &self.handle.id)
            .field("path", &self.handle.path)
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl<T> Serialize for AssetRef<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.handle.path.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for AssetRef<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let path = PathBuf::deserialize(deserializer)?;
        Ok(Self::unbound(path))
    }
}

/// Internal storage for a cached asset.
struct CachedEntry {
    /// `Arc<RwLock<AssetStatus<T>>>`, type-erased
    slot: Arc<dyn Any + Send + Sync>,
    /// The file path this asset was loaded from
    path: PathBuf,
    /// When the asset was last loaded (used for hot-reload change detection)
    load_time: SystemTime,
    /// Names of scenes or systems that depend on this asset
    dependents: Vec<String>,
    /// Waiting for `load_pending`
    pending: bool,
}

impl CachedEntry {
    fn slot<T: Asset>(&self) -> Option<Arc<Slot<T>>> {
        Arc::clone(&self.slot).downcast::<Slot<T>>().ok()
    }
}

/// A type-erased asset cache with deferred loading, hot-reload and dependency tracking.
///
/// # Features
///
/// - **Deduplication**: Loading the same file path twice returns the same slot
/// - **Shared readiness**: every [`AssetRef`] observes loads and reloads
/// - **Dependency tracking**: Tracks which scenes depend on which assets
/// - **Garbage collection**: Removes assets with no dependents
/// - **Hot reload**: Detects file changes and reloads modified assets in place
pub struct AssetCache {
    /// Asset slots indexed by ID
    assets: HashMap<AssetId, CachedEntry>,
    /// Reverse index from file path to asset ID (for deduplication)
    path_index: HashMap<PathBuf, AssetId>,
    /// Counter for generating unique asset IDs
    next_id: u64,
    /// Whether hot-reload file watching is enabled
    watch_for_changes: bool,
}

impl Default for AssetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetCache {
    /// Create a new empty asset cache.
    pub fn new() -> Self {
        Self {
            assets: HashMap::new(),
            path_index: HashMap::new(),
            next_id: 1, // Start at 1; 0 is reserved as "no asset"
            watch_for_changes: false,
        }
    }

    fn insert_entry<T: Asset>(&mut self, path: PathBuf, status: AssetStatus<T>, pending: bool) -> AssetRef<T> {
        let id = self.next_id;
        self.next_id += 1;

        let slot: Arc<Slot<T>> = Arc::new(RwLock::new(status));
        let erased: Arc<dyn Any + Send + Sync> = slot.clone();
        self.assets.insert(
            id,
            CachedEntry {
                slot: erased,
                path: path.clone(),
                load_time: SystemTime::now(),
                dependents: Vec::new(),
                pending,
            },
        );
        self.path_index.insert(path.clone(), id);

        AssetRef {
            handle: AssetHandle { id, path },
            slot,
        }
    }

    fn existing<T: Asset>(&self, path: &Path) -> Option<Result<AssetRef<T>, AssetError>> {
        let id = *self.path_index.get(path)?;
        let entry = self.assets.get(&id)?;
        Some(match entry.slot::<T>() {
            Some(slot) => Ok(AssetRef {
                handle: AssetHandle {
                    id,
                    path: path.to_path_buf(),
                },
                slot,
            }),
            None => Err(AssetError::TypeMismatch(path.display().to_string())),
        })
    }

    /// Load an asset from the given file path, or return the cached reference
    /// if already loaded.
    ///
    /// A path that was only [`request`](Self::request)ed is loaded now.
    ///
    /// # Errors
    ///
    /// Returns an [`AssetError`] if the file cannot be loaded or the path is
    /// already cached as another type.
    pub fn load<T: Asset>(&mut self, path: impl AsRef<Path>) -> Result<AssetRef<T>, AssetError> {
        let path = path.as_ref().to_path_buf();

        if let Some(existing) = self.existing::<T>(&path) {
            let asset = existing?;
            if !asset.is_ready() {
                self.load_entry::<T>(asset.id())?;
            }
            return Ok(asset);
        }

        let data = T::load_from_file(&path)?;
        Ok(self.insert_entry(path, AssetStatus::Ready(Arc::new(data)), false))
    }

    /// Register a path for deferred loading and return a not-yet-ready reference.
    ///
    /// # Errors
    ///
    /// Fails only if the path is already cached as another type.
    pub fn request<T: Asset>(&mut self, path: impl AsRef<Path>) -> Result<AssetRef<T>, AssetError> {
        let path = path.as_ref().to_path_buf();
        if let Some(existing) = self.existing::<T>(&path) {
            return existing;
        }
        Ok(self.insert_entry(path, AssetStatus::Queued, true))
    }

    /// Insert data produced in memory under a path, replacing any cached data.
    pub fn insert<T: Asset>(&mut self, path: impl AsRef<Path>, data: T) -> Result<AssetRef<T>, AssetError> {
        let path = path.as_ref().to_path_buf();
        match self.existing::<T>(&path) {
            Some(existing) => {
                let asset = existing?;
                store(&asset.slot, AssetStatus::Ready(Arc::new(data)));
                if let Some(entry) = self.assets.get_mut(&asset.id()) {
                    entry.pending = false;
                    entry.load_time = SystemTime::now();
                }
                Ok(asset)
            }
            None => Ok(self.insert_entry(path, AssetStatus::Ready(Arc::new(data)), false)),
        }
    }

    /// Bind a deserialized reference to this cache, loading the file if needed.
    pub fn resolve<T: Asset>(&mut self, asset: &mut AssetRef<T>) -> Result<(), AssetError> {
        if asset.id() != 0 && self.assets.contains_key(&asset.id()) {
            return Ok(());
        }
        *asset = self.load::<T>(asset.path().to_path_buf())?;
        Ok(())
    }

    fn load_entry<T: Asset>(&mut self, id: AssetId) -> Result<(), AssetError> {
        let Some(entry) = self.assets.get_mut(&id) else {
            return Err(AssetError::NotFound(id.to_string()));
        };
        let Some(slot) = entry.slot::<T>() else {
            return Err(AssetError::TypeMismatch(entry.path.display().to_string()));
        };

        entry.pending = false;
        entry.load_time = SystemTime::now();
        match T::load_from_file(&entry.path) {
            Ok(data) => {
                store(&slot, AssetStatus::Ready(Arc::new(data)));
                Ok(())
            }
            Err(err) => {
                store(&slot, AssetStatus::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Load every queued asset of type `T`.
    ///
    /// Returns handles of the assets that became ready. Failed loads are
    /// logged and leave the reference in the failed state.
    pub fn load_pending<T: Asset>(&mut self) -> Vec<AssetHandle> {
        let pending: Vec<(AssetId, PathBuf)> = self
            .assets
            .iter()
            .filter(|(_, entry)| entry.pending && entry.slot::<T>().is_some())
            .map(|(&id, entry)| (id, entry.path.clone()))
            .collect();

        let mut ready = Vec::new();
        for (id, path) in pending {
            match self.load_entry::<T>(id) {
                Ok(()) => {
                    log::debug!("Loaded asset: {}", path.display());
                    ready.push(AssetHandle { id, path });
                }
                Err(err) => {
                    log::warn!("Failed to load asset {}: {}", path.display(), err);
                }
            }
        }
        ready
    }

    /// Retrieve a cached asset by its handle, downcasting to the requested type.
    ///
    /// Returns `None` if the handle is invalid, the asset is not ready, or the
    /// stored type does not match `T`.
    pub fn get<T: Asset>(&self, handle: &AssetHandle) -> Option<Arc<T>> {
        let slot = self.assets.get(&handle.id)?.slot::<T>()?;
        let guard = slot.read().ok()?;
        match &*guard {
            AssetStatus::Ready(data) => Some(Arc::clone(data)),
            _ => None,
        }
    }

    /// Add a named dependent (e.g., a scene name) to an asset.
    pub fn add_dependent(&mut self, handle: &AssetHandle, scene_name: &str) {
        if let Some(entry) = self.assets.get_mut(&handle.id) {
            if !entry.dependents.iter().any(|d| d == scene_name) {
                entry.dependents.push(scene_name.to_string());
            }
        }
    }

    /// Remove a named dependent from an asset.
    pub fn remove_dependent(&mut self, handle: &AssetHandle, scene_name: &str) {
        if let Some(entry) = self.assets.get_mut(&handle.id) {
            entry.dependents.retain(|d| d != scene_name);
        }
    }

    /// Enable or disable hot-reload file change watching.
    pub fn set_watch_for_changes(&mut self, enabled: bool) {
        self.watch_for_changes = enabled;
    }

    /// Check whether hot-reload watching is enabled.
    pub fn is_watching_for_changes(&self) -> bool {
        self.watch_for_changes
    }

    /// Check for file changes and reload modified assets of type `T`.
    ///
    /// Reloaded data replaces the slot contents in place, so existing
    /// references see the new data. Returns handles of reloaded assets.
    pub fn check_hot_reload<T: Asset>(&mut self) -> Vec<AssetHandle> {
        if !self.watch_for_changes {
            return Vec::new();
        }

        let candidates: Vec<(AssetId, PathBuf, SystemTime)> = self
            .assets
            .iter()
            .filter(|(_, entry)| !entry.pending && entry.slot::<T>().is_some())
            .map(|(&id, entry)| (id, entry.path.clone(), entry.load_time))
            .collect();

        let mut reloaded = Vec::new();
        for (id, path, load_time) in candidates {
            let modified = match std::fs::metadata(&path).and_then(|meta| meta.modified()) {
                Ok(time) => time,
                Err(_) => continue,
            };

            if modified > load_time {
                match self.load_entry::<T>(id) {
                    Ok(()) => {
                        log::info!("Hot-reloaded asset: {}", path.display());
                        reloaded.push(AssetHandle { id, path });
                    }
                    Err(err) => {
                        log::warn!("Failed to hot-reload asset {}: {}", path.display(), err);
                    }
                }
            }
        }

        reloaded
    }

    /// Run garbage collection, removing assets with no dependents.
    ///
    /// Outstanding references keep their data alive but are no longer
    /// reloaded. Returns the number of assets that were removed.
    pub fn gc(&mut self) -> usize {
        let to_remove: Vec<AssetId> = self
            .assets
            .iter()
            .filter(|(_, entry)| entry.dependents.is_empty())
            .map(|(&id, _)| id)
            .collect();

        for id in &to_remove {
            if let Some(entry) = self.assets.remove(id) {
                self.path_index.remove(&entry.path);
            }
        }

        to_remove.len()
    }

    /// Get the number of assets currently in the cache.
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Check if an asset with the given handle is still in the cache.
    pub fn contains(&self, handle: &AssetHandle) -> bool {
        self.assets.contains_key(&handle.id)
    }

    /// Get the list of dependents for an asset.
    pub fn dependents(&self, handle: &AssetHandle) -> Option<&[String]> {
        self.assets.get(&handle.id).map(|e| e.dependents.as_slice())
    }
}
